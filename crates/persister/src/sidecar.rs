//! Sidecar records written next to each persisted image
//!
//! Pretty JSON with sorted payload keys, so reruns are byte-identical.

use contracts::AcceptedBundle;
use serde::Serialize;

pub const GAZE_SIDECAR: &str = "gaze.json";
pub const IMU_SIDECAR: &str = "imu.json";

/// The validated gaze sample
#[derive(Debug, Clone, Serialize)]
pub struct GazeSidecar<'a> {
    pub image_id: u64,
    pub image_timestamp: f64,
    /// Rebased onto the camera clock
    pub timestamp: f64,
    pub gaze3d: [f64; 3],
    pub data: &'a serde_json::Value,
}

/// Inertial state at the image
#[derive(Debug, Clone, Serialize)]
pub struct ImuSidecar<'a> {
    pub image_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gyroscope: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a serde_json::Value>,
}

impl<'a> GazeSidecar<'a> {
    pub fn from_bundle(bundle: &AcceptedBundle<'a>) -> Self {
        Self {
            image_id: bundle.image.id,
            image_timestamp: bundle.image.timestamp,
            timestamp: bundle.gaze.timestamp,
            gaze3d: bundle.gaze.direction.into(),
            data: &bundle.gaze.raw,
        }
    }
}

impl<'a> ImuSidecar<'a> {
    /// `None` when the bundle carries no inertial state
    pub fn from_bundle(bundle: &AcceptedBundle<'a>) -> Option<Self> {
        if bundle.inertial.is_none() && bundle.orientation.is_none() {
            return None;
        }
        Some(Self {
            image_id: bundle.image.id,
            timestamp: bundle.inertial.map(|s| s.timestamp),
            gyroscope: bundle.inertial.and_then(|s| s.gyroscope).map(Into::into),
            orientation: bundle.orientation.map(Into::into),
            data: bundle.inertial.map(|s| &s.raw),
        })
    }
}

/// Serialize a sidecar with a trailing newline
pub fn to_bytes<T: Serialize>(record: &T) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(record)?;
    bytes.push(b'\n');
    Ok(bytes)
}
