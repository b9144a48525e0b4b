//! FileSink - materializes accepted bundles under the output session directory
//!
//! ```text
//! <output_dir>/<id>/<id>.png
//! <output_dir>/<id>/<id>_depth.csv   (when the capture has one)
//! <output_dir>/<id>/gaze.json
//! <output_dir>/<id>/imu.json         (when inertial state exists)
//! ```
//!
//! A bundle directory left over from an earlier run is replaced, never merged.

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{AcceptedBundle, BundleSink, ContractError};
use tracing::{debug, error, instrument};

use crate::error::{PersisterError, Result};
use crate::layout::CameraFiles;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sidecar::{self, GAZE_SIDECAR, GazeSidecar, IMU_SIDECAR, ImuSidecar};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Input camera directory the images are copied from
    pub camera_dir: PathBuf,
    /// Output session directory
    pub output_dir: PathBuf,
}

/// Sink that writes bundles to disk
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    metrics: SinkMetrics,
}

impl FileSink {
    /// Create a new FileSink, creating the output directory if absent
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> Result<Self> {
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| PersisterError::io("create", &config.output_dir, e))?;

        Ok(Self {
            name: name.into(),
            config,
            metrics: SinkMetrics::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Directory of one bundle
    pub fn bundle_dir(&self, image_id: u64) -> PathBuf {
        self.config.output_dir.join(image_id.to_string())
    }

    fn write_bundle_to_disk(&self, bundle: &AcceptedBundle<'_>) -> Result<u64> {
        let image_id = bundle.image.id;
        let files = CameraFiles::locate(&self.config.camera_dir, image_id).ok_or_else(|| {
            PersisterError::MissingImage {
                image_id,
                camera_dir: self.config.camera_dir.clone(),
            }
        })?;

        let dir = self.bundle_dir(image_id);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| PersisterError::io("remove", &dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| PersisterError::io("create", &dir, e))?;

        let mut bytes = copy_into(&files.color, &dir)?;
        match &files.depth {
            Some(depth) => bytes += copy_into(depth, &dir)?,
            None => debug!(image_id, "no depth companion"),
        }

        bytes += write_file(
            &dir.join(GAZE_SIDECAR),
            &sidecar::to_bytes(&GazeSidecar::from_bundle(bundle))?,
        )?;
        if let Some(imu) = ImuSidecar::from_bundle(bundle) {
            bytes += write_file(&dir.join(IMU_SIDECAR), &sidecar::to_bytes(&imu)?)?;
        }

        Ok(bytes)
    }
}

fn copy_into(src: &Path, dir: &Path) -> Result<u64> {
    let name = src
        .file_name()
        .ok_or_else(|| PersisterError::io("copy", src, std::io::ErrorKind::InvalidInput.into()))?;
    fs::copy(src, dir.join(name)).map_err(|e| PersisterError::io("copy", src, e))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<u64> {
    fs::write(path, contents).map_err(|e| PersisterError::io("write", path, e))?;
    Ok(contents.len() as u64)
}

impl BundleSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, bundle),
        fields(sink = %self.name, image_id = bundle.image.id)
    )]
    fn write(&mut self, bundle: &AcceptedBundle<'_>) -> std::result::Result<(), ContractError> {
        match self.write_bundle_to_disk(bundle) {
            Ok(bytes) => {
                self.metrics.inc_write_count();
                self.metrics.add_bytes(bytes);
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                error!(sink = %self.name, image_id = bundle.image.id, error = %e, "Write failed");
                Err(e.into_contract(&self.name))
            }
        }
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    fn flush(&mut self) -> std::result::Result<(), ContractError> {
        debug!(sink = %self.name, metrics = %self.metrics.snapshot(), "FileSink flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CameraImage, GateMeasurements, GazeSample, InertialSample, Vector3};
    use tempfile::tempdir;

    fn gaze() -> GazeSample {
        GazeSample {
            timestamp: 0.995,
            direction: Vector3::new(0.0, 0.0, 1.0),
            raw: serde_json::json!({ "gaze3d": [0.0, 0.0, 1.0] }),
        }
    }

    fn bundle<'a>(gaze: &'a GazeSample, imu: Option<&'a InertialSample>) -> AcceptedBundle<'a> {
        AcceptedBundle {
            image: CameraImage::from_id(1_000_000),
            gaze,
            inertial: imu,
            orientation: None,
            scene_frame_index: None,
            measurements: GateMeasurements::default(),
        }
    }

    fn sink(root: &Path) -> FileSink {
        FileSink::new(
            "test_file",
            FileSinkConfig {
                camera_dir: root.join("camera"),
                output_dir: root.join("out/session"),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_file_sink_write_nested_layout() {
        let dir = tempdir().unwrap();
        let capture = dir.path().join("camera/1000000");
        fs::create_dir_all(&capture).unwrap();
        fs::write(capture.join("1000000.png"), b"color").unwrap();
        fs::write(capture.join("1000000_depth.csv"), b"1,2,3").unwrap();

        let mut sink = sink(dir.path());
        let g = gaze();
        sink.write(&bundle(&g, None)).unwrap();
        sink.flush().unwrap();

        let out = dir.path().join("out/session/1000000");
        assert_eq!(fs::read(out.join("1000000.png")).unwrap(), b"color");
        assert_eq!(fs::read(out.join("1000000_depth.csv")).unwrap(), b"1,2,3");
        let sidecar: serde_json::Value =
            serde_json::from_slice(&fs::read(out.join(GAZE_SIDECAR)).unwrap()).unwrap();
        assert_eq!(sidecar["timestamp"], 0.995);
        assert!(!out.join(IMU_SIDECAR).exists());
        assert_eq!(sink.metrics().write_count, 1);
    }

    #[test]
    fn test_file_sink_flat_layout_with_imu() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("camera")).unwrap();
        fs::write(dir.path().join("camera/1000000.png"), b"color").unwrap();

        let imu = InertialSample {
            timestamp: 0.99,
            gyroscope: Some(Vector3::new(0.1, 0.2, 0.3)),
            raw: serde_json::json!({ "gyroscope": [0.1, 0.2, 0.3] }),
        };
        let mut sink = sink(dir.path());
        let g = gaze();
        sink.write(&bundle(&g, Some(&imu))).unwrap();

        let out = sink.bundle_dir(1_000_000);
        assert!(out.join("1000000.png").is_file());
        assert!(!out.join("1000000_depth.csv").exists());
        assert!(out.join(IMU_SIDECAR).is_file());
    }

    #[test]
    fn test_file_sink_replaces_existing_bundle() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("camera")).unwrap();
        fs::write(dir.path().join("camera/1000000.png"), b"color").unwrap();

        let mut sink = sink(dir.path());
        let stale = sink.bundle_dir(1_000_000).join("stale.txt");
        fs::create_dir_all(sink.bundle_dir(1_000_000)).unwrap();
        fs::write(&stale, b"old").unwrap();

        let g = gaze();
        sink.write(&bundle(&g, None)).unwrap();
        assert!(!stale.exists());
        assert!(sink.bundle_dir(1_000_000).join(GAZE_SIDECAR).is_file());
    }

    #[test]
    fn test_file_sink_missing_color_is_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("camera")).unwrap();

        let mut sink = sink(dir.path());
        let g = gaze();
        let err = sink.write(&bundle(&g, None)).unwrap_err();
        assert!(matches!(err, ContractError::Persist { .. }));
        assert_eq!(sink.metrics().failure_count, 1);
        assert!(!sink.bundle_dir(1_000_000).exists());
    }
}
