//! Application state shared by the [`Controller`](crate::Controller) and the view.
//!
//! Everything the front end shows lives in one [`AppState`] value. It is
//! serializable so a UI layer can receive it whole, and it only changes
//! through [`AppState::apply`](crate::events).

use chrono::Datelike;
use serde::Serialize;

use winenotes_shared::constants::DEFAULT_RATING;
use winenotes_shared::photo::mime_for_file_name;
use winenotes_shared::{Photo, ValidationError, WineDraft, WineEntry, WineId, WineType};

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Central application state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    /// Local copy of the collection, in server order. Never patched in
    /// place: it is replaced wholesale on every successful fetch.
    pub wines: Vec<WineEntry>,

    pub form: FormState,

    /// A submit is in flight; the submit control is disabled.
    pub busy: bool,

    /// The one user-visible error message. Newest failure wins.
    pub error: Option<String>,

    /// Set by `begin_edit`, consumed by the view.
    pub scroll_to_top: bool,
}

/// A photo picked locally and not uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPhoto {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl PendingPhoto {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for_file_name(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Inline data URL showing the photo without a server round trip.
    pub fn preview(&self) -> Photo {
        Photo::inline(&self.mime, &self.bytes)
    }
}

/// Text inputs of the form, one per editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormField {
    Name,
    Type,
    Region,
    Vintage,
    Rating,
    Price,
    Notes,
}

/// The add/edit form as the user typed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    pub name: String,
    pub wine_type: String,
    pub region: String,
    pub vintage: String,
    pub rating: String,
    pub price: String,
    pub notes: String,

    /// Last photo the server knows about for this entry.
    pub photo: Option<Photo>,

    /// Inline preview of `pending_photo`.
    pub preview: Option<Photo>,

    /// `Some` while editing an existing entry, `None` for a new one.
    pub editing_id: Option<WineId>,

    #[serde(skip)]
    pub pending_photo: Option<PendingPhoto>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::blank(current_year())
    }
}

impl FormState {
    pub fn blank(year: i32) -> Self {
        Self {
            name: String::new(),
            wine_type: WineType::default().to_string(),
            region: String::new(),
            vintage: year.to_string(),
            rating: DEFAULT_RATING.to_string(),
            price: String::new(),
            notes: String::new(),
            photo: None,
            preview: None,
            editing_id: None,
            pending_photo: None,
        }
    }

    pub fn from_entry(entry: &WineEntry) -> Self {
        Self {
            name: entry.name.clone(),
            wine_type: entry.wine_type.to_string(),
            region: entry.region.clone(),
            vintage: entry.vintage.map(|v| v.to_string()).unwrap_or_default(),
            rating: entry.rating.to_string(),
            price: entry.price.map(|p| p.to_string()).unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
            photo: entry.photo.clone(),
            preview: None,
            editing_id: Some(entry.id.clone()),
            pending_photo: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Type => &mut self.wine_type,
            FormField::Region => &mut self.region,
            FormField::Vintage => &mut self.vintage,
            FormField::Rating => &mut self.rating,
            FormField::Price => &mut self.price,
            FormField::Notes => &mut self.notes,
        }
    }

    /// Turn the typed text into a validated draft.
    ///
    /// Vintage and rating become integers, a blank price becomes "unknown"
    /// and blank notes are dropped. The photo is the last server-known one;
    /// the caller swaps in a fresh upload when there is one.
    pub fn normalize(&self, latest_vintage: i32) -> Result<WineDraft, ValidationError> {
        let wine_type: WineType = self.wine_type.trim().parse()?;

        let vintage = match self.vintage.trim() {
            "" => None,
            raw => Some(parse_number::<i32>("vintage", raw)?),
        };

        let rating = parse_number::<i64>("rating", self.rating.trim())?;
        let rating =
            u8::try_from(rating).map_err(|_| ValidationError::RatingOutOfRange(rating))?;

        let price = match self.price.trim() {
            "" => None,
            raw => Some(parse_number::<f64>("price", raw)?),
        };

        let notes = Some(self.notes.clone()).filter(|n| !n.trim().is_empty());

        let draft = WineDraft {
            name: self.name.clone(),
            wine_type,
            region: self.region.clone(),
            vintage,
            rating,
            price,
            notes,
            photo: self.photo.clone(),
        };
        draft.validate(latest_vintage)?;
        Ok(draft)
    }
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    raw: &str,
) -> Result<T, ValidationError> {
    raw.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: raw.to_string(),
    })
}
