use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use winenotes_shared::ValidationError;
use winenotes_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Photo too large: {size} bytes (max {max})")]
    PhotoTooLarge { size: usize, max: usize },

    #[error("Upload body exceeds the limit (max {max} bytes)")]
    UploadTooLarge { max: usize },

    #[error("Photo storage error: {0}")]
    PhotoStorage(String),

    #[error("Database error: {0}")]
    Store(StoreError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ServerError::NotFound("Wine"),
            other => ServerError::Store(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ServerError::PhotoTooLarge { .. } | ServerError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::PhotoStorage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Photo storage error".to_string())
            }
            ServerError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
