//! # winenotes-store
//!
//! Server-side persistence for wine notes, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection`, runs migrations on open and provides typed CRUD
//! helpers over [`WineEntry`](winenotes_shared::WineEntry).

pub mod database;
pub mod migrations;
pub mod wines;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
