//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Neither a configuration file nor a complete set of session paths
    #[error("Missing session setting '{field}': pass --config or --{field}")]
    MissingSessionSetting { field: &'static str },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn missing_session_setting(field: &'static str) -> Self {
        Self::MissingSessionSetting { field }
    }
}
