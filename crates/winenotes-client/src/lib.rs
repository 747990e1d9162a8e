//! # winenotes-client
//!
//! Client side of Wine Notes: a form/state controller that keeps a local
//! copy of the wine collection in step with the REST API, the HTTP client
//! it talks through, and the view models a front end renders.
//!
//! The server is always the source of truth. After every successful write
//! the whole collection is fetched again and replaces the local cache.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod render;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use api::{HttpApi, WineApi};
pub use config::ClientConfig;
pub use controller::{Confirm, Controller};
pub use error::ClientError;
pub use events::AppEvent;
pub use state::{AppState, FormField, FormState, PendingPhoto};

/// Install the default log subscriber for an embedding application.
///
/// `RUST_LOG` wins over the built-in filter when set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("winenotes_client=debug,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::info!("Starting Wine Notes client");
}
