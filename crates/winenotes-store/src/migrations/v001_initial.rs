//! v001 -- Initial schema creation.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Wines (tasting notes)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS wines (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT, -- insertion order
    id         TEXT NOT NULL UNIQUE,              -- UUID v4
    name       TEXT NOT NULL,
    wine_type  TEXT NOT NULL,                     -- "Red", "Rosé", ...
    region     TEXT NOT NULL,
    vintage    INTEGER,
    rating     INTEGER NOT NULL,
    price      REAL,
    notes      TEXT,
    photo      TEXT,                              -- data URL or server path
    created_at TEXT NOT NULL,                     -- RFC-3339
    updated_at TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
