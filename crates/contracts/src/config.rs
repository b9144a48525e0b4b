//! AlignmentConfig - Config Loader output
//!
//! Describes one session: where the two recordings live, where bundles go,
//! and the thresholds the validator applies.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Input and output locations
    pub session: SessionConfig,

    /// Validator thresholds
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Inertial update rule
    #[serde(default)]
    pub inertial: InertialConfig,

    /// Scene video decoding
    #[serde(default)]
    pub video: VideoConfig,
}

impl AlignmentConfig {
    /// Default settings for one session
    pub fn for_session(session: SessionConfig) -> Self {
        Self {
            version: ConfigVersion::default(),
            session,
            thresholds: Thresholds::default(),
            inertial: InertialConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

/// Session locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session name; defaults to the camera directory's parent name
    #[serde(default)]
    pub name: Option<String>,

    /// Camera recorder output directory
    pub camera_dir: PathBuf,

    /// Eye-tracker recorder output directory
    pub eye_tracker_dir: PathBuf,

    /// Root of the processed output tree
    pub output_root: PathBuf,

    /// File names inside the session directories
    #[serde(default)]
    pub files: SessionFiles,
}

impl SessionConfig {
    pub fn new(
        camera_dir: impl Into<PathBuf>,
        eye_tracker_dir: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: None,
            camera_dir: camera_dir.into(),
            eye_tracker_dir: eye_tracker_dir.into(),
            output_root: output_root.into(),
            files: SessionFiles::default(),
        }
    }

    /// Resolved session name
    pub fn session_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.camera_dir
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("session")
            .to_string()
    }

    /// Directory accepted bundles are written to
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(self.session_name())
    }

    /// Camera recorder session-start file
    pub fn camera_start_path(&self) -> PathBuf {
        self.camera_dir.join(&self.files.start_timestamp)
    }

    /// Eye-tracker recorder session-start file
    pub fn eye_tracker_start_path(&self) -> PathBuf {
        self.eye_tracker_dir.join(&self.files.start_timestamp)
    }

    /// Compressed gaze records
    pub fn gaze_path(&self) -> PathBuf {
        self.eye_tracker_dir.join(&self.files.gaze)
    }

    /// Compressed inertial records
    pub fn imu_path(&self) -> PathBuf {
        self.eye_tracker_dir.join(&self.files.imu)
    }

    /// Scene camera video
    pub fn scene_video_path(&self) -> PathBuf {
        self.eye_tracker_dir.join(&self.files.scene_video)
    }
}

/// File names inside the session directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFiles {
    #[serde(default = "default_gaze_file")]
    pub gaze: String,
    #[serde(default = "default_imu_file")]
    pub imu: String,
    #[serde(default = "default_scene_video_file")]
    pub scene_video: String,
    #[serde(default = "default_start_timestamp_file")]
    pub start_timestamp: String,
}

impl Default for SessionFiles {
    fn default() -> Self {
        Self {
            gaze: default_gaze_file(),
            imu: default_imu_file(),
            scene_video: default_scene_video_file(),
            start_timestamp: default_start_timestamp_file(),
        }
    }
}

fn default_gaze_file() -> String {
    "gazedata.gz".to_string()
}

fn default_imu_file() -> String {
    "imudata.gz".to_string()
}

fn default_scene_video_file() -> String {
    "scenevideo.mp4".to_string()
}

fn default_start_timestamp_file() -> String {
    "start_timestamp.txt".to_string()
}

/// Session-wide validator thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Gaze window retention around the image time (seconds)
    pub gaze_time_threshold: f64,
    /// Maximum gap between the image and the latest gaze sample (seconds)
    pub gaze_time_epsilon: f64,
    /// Maximum distance between the mean and the latest unit direction
    pub gaze_distance_epsilon: f64,
    /// Maximum dispersion of the unit directions in the window
    pub gaze_variance_epsilon: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            gaze_time_threshold: 0.2,
            gaze_time_epsilon: 0.05,
            gaze_distance_epsilon: 0.1,
            gaze_variance_epsilon: 0.01,
        }
    }
}

/// Inertial update configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InertialConfig {
    #[serde(default)]
    pub policy: InertialPolicy,
}

/// How gyroscope samples update the bundle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InertialPolicy {
    /// Keep only the most recent gyroscope sample
    #[default]
    Latest,
    /// Also integrate angular velocity into a running orientation vector
    Integrate,
}

/// Scene video decoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Decode the scene video at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
    /// ffprobe executable
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}
