//! Persister error types

use std::path::{Path, PathBuf};

use contracts::ContractError;
use thiserror::Error;

/// Persister-specific errors
#[derive(Debug, Error)]
pub enum PersisterError {
    /// The color image of an accepted bundle is not in the camera tree
    #[error("color image for {image_id} not found under {camera_dir}")]
    MissingImage { image_id: u64, camera_dir: PathBuf },

    /// Filesystem operation failed
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar serialization failed
    #[error("sidecar serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersisterError {
    pub fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Surface as a contract error tagged with the sink name
    pub fn into_contract(self, sink: &str) -> ContractError {
        ContractError::persist(sink, self.to_string())
    }
}

/// Persister Result type alias
pub type Result<T> = std::result::Result<T, PersisterError>;
