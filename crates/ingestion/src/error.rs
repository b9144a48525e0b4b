//! Ingestion error types
//!
//! Record-level failures. Sources turn these into warnings and skip counts;
//! they only escape as [`contracts::ContractError`] when a whole source
//! cannot be opened.

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Line is not valid JSON
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// Required field absent
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    /// Field present but malformed
    #[error("invalid field '{field}': {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Line is not UTF-8
    #[error("invalid utf-8 after byte {valid_up_to}")]
    Utf8 { valid_up_to: usize },

    /// Video decoder failure
    #[error("decoder error: {message}")]
    Decoder { message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestionError {
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    pub fn decoder(message: impl Into<String>) -> Self {
        Self::Decoder {
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
