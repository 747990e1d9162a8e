use thiserror::Error;

/// Reasons a wine draft is rejected before it is persisted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Rating must be between 1 and 10, got {0}")]
    RatingOutOfRange(i64),

    #[error("Vintage must be between 1900 and {max}, got {vintage}")]
    VintageOutOfRange { vintage: i64, max: i32 },

    #[error("Price must be a non-negative number")]
    InvalidPrice,

    #[error("Unknown wine type: {0}")]
    UnknownWineType(String),

    #[error("{field} is not a valid number: {value:?}")]
    NotANumber { field: &'static str, value: String },
}
