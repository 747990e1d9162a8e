//! # winenotes-server
//!
//! REST backend for Wine Notes:
//! - **collection API** (`/api/wines`) persisted in SQLite via `winenotes-store`
//! - **photo uploads** stored as plain files under the data directory and
//!   served back from `/api/uploads/{filename}`
//! - a health endpoint at `/`

pub mod api;
pub mod config;
pub mod error;
pub mod photo_store;

pub use api::{build_router, serve, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
