//! Layered error definitions
//!
//! Categorized by source: calibration / config / source / persist

use thiserror::Error;

use crate::StreamKind;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Calibration Errors =====
    /// Session start timestamp missing, empty or unparsable
    #[error("calibration error for '{path}': {message}")]
    Calibration { path: String, message: String },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// A stream source could not be opened
    #[error("failed to open {stream} source: {message}")]
    SourceOpen { stream: StreamKind, message: String },

    /// A single record could not be parsed
    #[error("{stream} record parse error at line {line}: {message}")]
    RecordParse {
        stream: StreamKind,
        line: u64,
        message: String,
    },

    // ===== Persist Errors =====
    /// Bundle write error
    #[error("sink '{sink}' persist error: {message}")]
    Persist { sink: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create calibration error
    pub fn calibration(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Calibration {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source open error
    pub fn source_open(stream: StreamKind, message: impl Into<String>) -> Self {
        Self::SourceOpen {
            stream,
            message: message.into(),
        }
    }

    /// Create record parse error
    pub fn record_parse(stream: StreamKind, line: u64, message: impl Into<String>) -> Self {
        Self::RecordParse {
            stream,
            line,
            message: message.into(),
        }
    }

    /// Create persist error
    pub fn persist(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persist {
            sink: sink.into(),
            message: message.into(),
        }
    }
}
