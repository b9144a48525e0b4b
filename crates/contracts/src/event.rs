//! TimedEvent - Stream Source output
//!
//! Typed events produced by the four session streams. Every event carries a
//! timestamp in seconds on the camera clock, except scene-video frames which
//! keep their own millisecond clock.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Camera image ids are microsecond device timestamps.
pub const CAMERA_ID_TO_SECONDS: f64 = 1e-6;

/// Stream identity.
///
/// Declaration order is the merge tie-break priority: when two pending events
/// carry the same timestamp, the lower kind is dispatched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    CameraImage,
    Gaze,
    Inertial,
    SceneVideo,
}

impl StreamKind {
    /// All kinds in priority order
    pub const ALL: [StreamKind; 4] = [
        StreamKind::CameraImage,
        StreamKind::Gaze,
        StreamKind::Inertial,
        StreamKind::SceneVideo,
    ];

    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::CameraImage => "camera_image",
            StreamKind::Gaze => "gaze",
            StreamKind::Inertial => "inertial",
            StreamKind::SceneVideo => "scene_video",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// One captured camera image, identified by its device timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraImage {
    /// Microsecond device timestamp, also the on-disk file stem
    pub id: u64,

    /// `id` expressed in seconds
    pub timestamp: f64,
}

impl CameraImage {
    pub fn from_id(id: u64) -> Self {
        Self {
            id,
            timestamp: id as f64 * CAMERA_ID_TO_SECONDS,
        }
    }
}

/// Eye-tracker gaze sample, already rebased onto the camera clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// Rebased timestamp (seconds)
    pub timestamp: f64,

    /// `gaze3d` direction as recorded (not normalized)
    pub direction: Vector3,

    /// The record's `data` object, kept verbatim for the sidecar
    pub raw: serde_json::Value,
}

/// Eye-tracker inertial sample, already rebased onto the camera clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InertialSample {
    /// Rebased timestamp (seconds)
    pub timestamp: f64,

    /// Angular velocity, present only on gyroscope records
    pub gyroscope: Option<Vector3>,

    /// The record's `data` object, kept verbatim for the sidecar
    pub raw: serde_json::Value,
}

impl InertialSample {
    /// Whether this record carries a gyroscope reading
    pub fn has_gyro(&self) -> bool {
        self.gyroscope.is_some()
    }
}

/// Decoded image data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Image width
    pub width: u32,

    /// Image height
    pub height: u32,

    /// Pixel format
    pub format: ImageFormat,

    /// Raw pixel data
    pub data: Bytes,
}

/// Pixel format; decoders emit packed 8-bit RGB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Rgb8,
}

impl ImageFormat {
    /// Bytes per pixel
    pub const fn channels(&self) -> usize {
        match self {
            ImageFormat::Rgb8 => 3,
        }
    }
}

/// Decoded scene-video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    /// Milliseconds since the start of the video (own clock, not rebased)
    pub timestamp_ms: f64,

    /// Zero-based decode index
    pub index: u64,

    /// Decoded pixels
    pub image: ImageData,
}

/// Tagged union over the four stream event types.
#[derive(Debug, Clone, PartialEq)]
pub enum TimedEvent {
    CameraImage(CameraImage),
    Gaze(GazeSample),
    Inertial(InertialSample),
    SceneVideo(SceneFrame),
}

impl TimedEvent {
    /// Merge key of this event.
    ///
    /// Scene-video frames report their millisecond clock unchanged.
    pub fn timestamp(&self) -> f64 {
        match self {
            TimedEvent::CameraImage(image) => image.timestamp,
            TimedEvent::Gaze(sample) => sample.timestamp,
            TimedEvent::Inertial(sample) => sample.timestamp,
            TimedEvent::SceneVideo(frame) => frame.timestamp_ms,
        }
    }

    /// Stream this event belongs to
    pub fn kind(&self) -> StreamKind {
        match self {
            TimedEvent::CameraImage(_) => StreamKind::CameraImage,
            TimedEvent::Gaze(_) => StreamKind::Gaze,
            TimedEvent::Inertial(_) => StreamKind::Inertial,
            TimedEvent::SceneVideo(_) => StreamKind::SceneVideo,
        }
    }
}
