//! Conversion error types.

use thiserror::Error;

/// Errors from projecting wire messages onto domain objects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("negative value for {field}: {value}")]
    NegativeField { field: &'static str, value: i64 },

    #[error("invalid global id: expected 12 bytes, got {len}")]
    InvalidGlobalId { len: usize },

    #[error("unknown sort order: {0}")]
    UnknownSortOrder(i32),
}

impl ConvertError {
    /// Returns an error code suitable for logs and metrics labels.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConvertError::NegativeField { .. } => "NEGATIVE_FIELD",
            ConvertError::InvalidGlobalId { .. } => "INVALID_GLOBAL_ID",
            ConvertError::UnknownSortOrder(_) => "UNKNOWN_SORT_ORDER",
        }
    }
}
