//! # winenotes-shared
//!
//! Types shared by the Wine Notes client, server and store: the wire model
//! of a tasting note, photo references, validation rules and constants.

pub mod constants;
pub mod error;
pub mod photo;
pub mod types;

pub use error::ValidationError;
pub use photo::Photo;
pub use types::{WineDraft, WineEntry, WineId, WineType};
