use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{RATING_MAX, RATING_MIN, VINTAGE_MIN};
use crate::error::ValidationError;
use crate::photo::Photo;

// Server-assigned, opaque to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct WineId(pub String);

impl WineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WineType {
    #[default]
    Red,
    White,
    #[serde(rename = "Rosé")]
    Rose,
    Sparkling,
    Dessert,
    Fortified,
}

impl WineType {
    pub const ALL: [WineType; 6] = [
        WineType::Red,
        WineType::White,
        WineType::Rose,
        WineType::Sparkling,
        WineType::Dessert,
        WineType::Fortified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "Red",
            WineType::White => "White",
            WineType::Rose => "Rosé",
            WineType::Sparkling => "Sparkling",
            WineType::Dessert => "Dessert",
            WineType::Fortified => "Fortified",
        }
    }
}

impl std::fmt::Display for WineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WineType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WineType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownWineType(s.to_string()))
    }
}

/// A tasting note without identity: the body of create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    pub region: String,
    #[serde(default)]
    pub vintage: Option<i32>,
    pub rating: u8,
    /// `None` means the price is unknown, not free.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo: Option<Photo>,
}

impl WineDraft {
    /// Check field bounds. `latest_vintage` is the newest accepted year.
    pub fn validate(&self, latest_vintage: i32) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.region.trim().is_empty() {
            return Err(ValidationError::MissingField("region"));
        }
        if !(RATING_MIN..=RATING_MAX).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(i64::from(self.rating)));
        }
        if let Some(vintage) = self.vintage {
            if !(VINTAGE_MIN..=latest_vintage).contains(&vintage) {
                return Err(ValidationError::VintageOutOfRange {
                    vintage: i64::from(vintage),
                    max: latest_vintage,
                });
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ValidationError::InvalidPrice);
            }
        }
        Ok(())
    }
}

/// A persisted tasting note as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineEntry {
    pub id: WineId,
    pub name: String,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    pub region: String,
    #[serde(default)]
    pub vintage: Option<i32>,
    pub rating: u8,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo: Option<Photo>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parse an RFC 3339 timestamp or a naive ISO 8601 one taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// Timestamps are informational: one the client cannot read becomes `None`
// instead of failing the whole entry.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

impl WineEntry {
    pub fn from_draft(
        id: WineId,
        draft: WineDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            wine_type: draft.wine_type,
            region: draft.region,
            vintage: draft.vintage,
            rating: draft.rating,
            price: draft.price,
            notes: draft.notes,
            photo: draft.photo,
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }

    pub fn to_draft(&self) -> WineDraft {
        WineDraft {
            name: self.name.clone(),
            wine_type: self.wine_type,
            region: self.region.clone(),
            vintage: self.vintage,
            rating: self.rating,
            price: self.price,
            notes: self.notes.clone(),
            photo: self.photo.clone(),
        }
    }
}
