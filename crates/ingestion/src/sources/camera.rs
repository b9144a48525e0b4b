//! Camera directory source
//!
//! Two on-disk layouts are recognized, and may be mixed:
//! - `<id>/<id>.png` (one directory per capture, with depth companions inside)
//! - `<id>.png` directly in the camera directory, companions alongside
//!
//! `<id>` is the device timestamp in microseconds.

use std::collections::VecDeque;
use std::path::Path;

use contracts::{CameraImage, ContractError, EventSource, SourceStats, StreamKind, TimedEvent};
use tracing::{debug, info, warn};

use super::common::record_skipped;

/// How a camera directory entry is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraEntry {
    /// A capture with this id
    Image(u64),
    /// Depth or greyscale companion of a capture (`<id>_depth.png`, ...)
    Companion,
    /// Session start file
    Metadata,
    /// Anything else
    Invalid,
}

/// Classify one entry of the camera directory
pub fn classify_entry(name: &str, is_dir: bool, start_file: &str) -> CameraEntry {
    if is_dir {
        return match name.parse::<u64>() {
            Ok(id) => CameraEntry::Image(id),
            Err(_) => CameraEntry::Invalid,
        };
    }
    if name == start_file {
        return CameraEntry::Metadata;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some(parts) => parts,
        None => return CameraEntry::Invalid,
    };
    if ext.eq_ignore_ascii_case("png") {
        if let Ok(id) = stem.parse::<u64>() {
            return CameraEntry::Image(id);
        }
    }
    match stem.split_once('_') {
        Some((prefix, _)) if prefix.parse::<u64>().is_ok() => CameraEntry::Companion,
        _ => CameraEntry::Invalid,
    }
}

/// Camera images in ascending id order
pub struct CameraImageSource {
    ids: VecDeque<u64>,
    stats: SourceStats,
}

impl CameraImageSource {
    /// List the camera directory
    ///
    /// # Errors
    /// Fails only if the directory itself cannot be read. Unrecognized
    /// entries are skipped with a warning.
    pub fn open(dir: &Path, start_file: &str) -> Result<Self, ContractError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ContractError::source_open(
                StreamKind::CameraImage,
                format!("cannot read {}: {e}", dir.display()),
            )
        })?;

        let mut ids = Vec::new();
        let mut skipped = 0u64;
        for entry in entries {
            let entry = entry.map_err(|e| {
                ContractError::source_open(
                    StreamKind::CameraImage,
                    format!("cannot list {}: {e}", dir.display()),
                )
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!(entry = ?name, "non-UTF-8 camera entry skipped");
                skipped += 1;
                record_skipped(StreamKind::CameraImage);
                continue;
            };
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            match classify_entry(name, is_dir, start_file) {
                CameraEntry::Image(id)
                    if is_dir && !entry.path().join(format!("{id}.png")).is_file() =>
                {
                    warn!(entry = name, "capture directory has no color image, skipped");
                    skipped += 1;
                    record_skipped(StreamKind::CameraImage);
                }
                CameraEntry::Image(id) => ids.push(id),
                CameraEntry::Companion | CameraEntry::Metadata => {}
                CameraEntry::Invalid => {
                    warn!(entry = name, "camera entry is not a timestamp, skipped");
                    skipped += 1;
                    record_skipped(StreamKind::CameraImage);
                }
            }
        }

        ids.sort_unstable();
        let listed = ids.len();
        ids.dedup();
        if ids.len() != listed {
            debug!(duplicates = listed - ids.len(), "capture present in both layouts");
        }
        info!(dir = %dir.display(), images = ids.len(), skipped, "camera directory listed");

        Ok(Self {
            ids: ids.into(),
            stats: SourceStats {
                skipped,
                ..SourceStats::default()
            },
        })
    }

    /// Remaining image count
    pub fn remaining(&self) -> usize {
        self.ids.len()
    }
}

impl EventSource for CameraImageSource {
    fn kind(&self) -> StreamKind {
        StreamKind::CameraImage
    }

    fn next_event(&mut self) -> Option<TimedEvent> {
        let id = self.ids.pop_front()?;
        self.stats.emitted += 1;
        Some(TimedEvent::CameraImage(CameraImage::from_id(id)))
    }

    fn stats(&self) -> SourceStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const START: &str = "start_timestamp.txt";

    #[test]
    fn test_classify() {
        assert_eq!(classify_entry("1000", true, START), CameraEntry::Image(1000));
        assert_eq!(classify_entry("1000.png", false, START), CameraEntry::Image(1000));
        assert_eq!(classify_entry("1000_depth.png", false, START), CameraEntry::Companion);
        assert_eq!(classify_entry("1000_depth.csv", false, START), CameraEntry::Companion);
        assert_eq!(classify_entry(START, false, START), CameraEntry::Metadata);
        assert_eq!(classify_entry("notes", true, START), CameraEntry::Invalid);
        assert_eq!(classify_entry("abc.png", false, START), CameraEntry::Invalid);
        assert_eq!(classify_entry("1000.csv", false, START), CameraEntry::Invalid);
        assert_eq!(classify_entry("README", false, START), CameraEntry::Invalid);
    }

    #[test]
    fn test_open_sorts_and_dedupes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(START), "2024-06-12 17:01:48.000000").unwrap();
        fs::create_dir(root.join("3000000")).unwrap();
        fs::write(root.join("3000000").join("3000000.png"), b"png").unwrap();
        fs::write(root.join("1000000.png"), b"png").unwrap();
        fs::write(root.join("1000000_depth.csv"), b"1,2").unwrap();
        fs::create_dir(root.join("2000000")).unwrap();
        fs::write(root.join("2000000").join("2000000.png"), b"png").unwrap();
        fs::write(root.join("2000000.png"), b"png").unwrap();
        fs::write(root.join("garbage.png"), b"png").unwrap();

        let mut source = CameraImageSource::open(root, START).unwrap();
        assert_eq!(source.remaining(), 3);

        let mut out = Vec::new();
        while let Some(TimedEvent::CameraImage(image)) = source.next_event() {
            out.push(image);
        }
        let ids: Vec<u64> = out.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1_000_000, 2_000_000, 3_000_000]);
        assert!((out[0].timestamp - 1.0).abs() < 1e-12);

        let stats = source.stats();
        assert_eq!(stats.emitted, 3);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_capture_dir_without_color_image_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("1000000")).unwrap();
        fs::write(root.join("1000000").join("1000000_depth.csv"), b"1,2").unwrap();
        fs::create_dir(root.join("2000000")).unwrap();
        fs::write(root.join("2000000").join("2000000.png"), b"png").unwrap();

        let mut source = CameraImageSource::open(root, START).unwrap();
        assert_eq!(source.remaining(), 1);
        let Some(TimedEvent::CameraImage(image)) = source.next_event() else {
            panic!("expected a camera image");
        };
        assert_eq!(image.id, 2_000_000);
        assert_eq!(source.stats().skipped, 1);
    }

    #[test]
    fn test_open_missing_dir() {
        let dir = tempdir().unwrap();
        let err = CameraImageSource::open(&dir.path().join("absent"), START).err().unwrap();
        assert!(matches!(
            err,
            ContractError::SourceOpen {
                stream: StreamKind::CameraImage,
                ..
            }
        ));
    }
}
