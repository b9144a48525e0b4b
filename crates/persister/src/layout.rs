//! Input camera tree layout

use std::path::{Path, PathBuf};

/// Suffix of the depth companion next to a color image
pub const DEPTH_SUFFIX: &str = "_depth.csv";

/// Files of one capture in the camera tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFiles {
    pub color: PathBuf,
    pub depth: Option<PathBuf>,
}

impl CameraFiles {
    /// Find the capture `id`, preferring `<id>/<id>.png` over `<id>.png`
    pub fn locate(camera_dir: &Path, id: u64) -> Option<Self> {
        let nested = camera_dir.join(id.to_string());
        let found = [nested.as_path(), camera_dir]
            .into_iter()
            .find_map(|dir| Self::in_dir(dir, id));
        found
    }

    fn in_dir(dir: &Path, id: u64) -> Option<Self> {
        let color = dir.join(format!("{id}.png"));
        if !color.is_file() {
            return None;
        }
        let depth = dir.join(format!("{id}{DEPTH_SUFFIX}"));
        Some(Self {
            color,
            depth: depth.is_file().then_some(depth),
        })
    }
}
