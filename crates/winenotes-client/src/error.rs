use thiserror::Error;

use winenotes_shared::ValidationError;

/// Everything that can go wrong between the controller and the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("decode: {0}")]
    Decode(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("a save is already in progress")]
    Busy,
}
