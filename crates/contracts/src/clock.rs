//! SessionClockOffset - Clock Offset Calibrator output

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed offset between the two recorders' session starts, in seconds.
///
/// `offset = eye_tracker_start - camera_start`. Computed once per session and
/// subtracted from every eye-tracker timestamp before it enters the merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionClockOffset(f64);

impl SessionClockOffset {
    /// Offset from a number of seconds
    pub const fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Offset from a signed microsecond count
    pub fn from_micros(micros: i64) -> Self {
        Self(micros as f64 / 1e6)
    }

    /// Offset in seconds
    pub fn seconds(&self) -> f64 {
        self.0
    }

    /// Move an eye-tracker timestamp onto the camera clock
    #[inline]
    pub fn rebase(&self, eye_tracker_timestamp: f64) -> f64 {
        eye_tracker_timestamp - self.0
    }
}

impl fmt::Display for SessionClockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.6}s", self.0)
    }
}
