use chrono::{DateTime, Utc};
use rusqlite::params;

use winenotes_shared::{Photo, WineDraft, WineEntry, WineId, WineType};

use crate::database::Database;
use crate::error::{Result, StoreError};

const SELECT_COLUMNS: &str =
    "SELECT id, name, wine_type, region, vintage, rating, price, notes, photo, created_at, updated_at
     FROM wines";

impl Database {
    pub fn insert_wine(&self, wine: &WineEntry) -> Result<()> {
        let created_at = wine.created_at.unwrap_or_else(Utc::now);
        let updated_at = wine.updated_at.unwrap_or(created_at);

        self.conn().execute(
            "INSERT INTO wines (id, name, wine_type, region, vintage, rating, price, notes, photo, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                wine.id.as_str(),
                wine.name,
                wine.wine_type.as_str(),
                wine.region,
                wine.vintage,
                wine.rating,
                wine.price,
                wine.notes,
                wine.photo.as_ref().map(Photo::as_str),
                created_at.to_rfc3339(),
                updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_wine(&self, id: &WineId) -> Result<WineEntry> {
        self.conn()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.as_str()],
                row_to_wine,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// All wines in insertion order.
    pub fn list_wines(&self) -> Result<Vec<WineEntry>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY seq ASC"))?;
        let rows = stmt.query_map([], row_to_wine)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Replace every field of an existing wine. `created_at` is kept.
    pub fn update_wine(
        &self,
        id: &WineId,
        draft: &WineDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<WineEntry> {
        let affected = self.conn().execute(
            "UPDATE wines
             SET name = ?2, wine_type = ?3, region = ?4, vintage = ?5, rating = ?6,
                 price = ?7, notes = ?8, photo = ?9, updated_at = ?10
             WHERE id = ?1",
            params![
                id.as_str(),
                draft.name,
                draft.wine_type.as_str(),
                draft.region,
                draft.vintage,
                draft.rating,
                draft.price,
                draft.notes,
                draft.photo.as_ref().map(Photo::as_str),
                updated_at.to_rfc3339(),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_wine(id)
    }

    pub fn delete_wine(&self, id: &WineId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM wines WHERE id = ?1", params![id.as_str()])?;
        Ok(affected > 0)
    }
}

fn row_to_wine(row: &rusqlite::Row<'_>) -> rusqlite::Result<WineEntry> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let type_str: String = row.get(2)?;
    let region: String = row.get(3)?;
    let vintage: Option<i32> = row.get(4)?;
    let rating: u8 = row.get(5)?;
    let price: Option<f64> = row.get(6)?;
    let notes: Option<String> = row.get(7)?;
    let photo: Option<String> = row.get(8)?;
    let created_str: String = row.get(9)?;
    let updated_str: String = row.get(10)?;

    let wine_type: WineType = type_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(WineEntry {
        id: WineId(id),
        name,
        wine_type,
        region,
        vintage,
        rating,
        price,
        notes,
        photo: photo.map(Photo::from),
        created_at: Some(parse_timestamp(9, &created_str)?),
        updated_at: Some(parse_timestamp(10, &updated_str)?),
    })
}

fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
}
