//! Gaze Validator output

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate bundle was not persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No camera image has been seen yet
    MissingImage,
    /// The gaze snapshot was empty
    EmptyWindow,
    /// Latest gaze sample too far from the image time
    Recency,
    /// Latest direction disagrees with the window mean
    Agreement,
    /// Directions in the window are too dispersed
    Stability,
}

impl RejectReason {
    pub const ALL: [RejectReason; 5] = [
        RejectReason::MissingImage,
        RejectReason::EmptyWindow,
        RejectReason::Recency,
        RejectReason::Agreement,
        RejectReason::Stability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingImage => "missing_image",
            RejectReason::EmptyWindow => "empty_window",
            RejectReason::Recency => "recency",
            RejectReason::Agreement => "agreement",
            RejectReason::Stability => "stability",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Quantities computed by the gates that actually ran.
///
/// A gate short-circuited away leaves its field `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GateMeasurements {
    /// `|image_timestamp - latest.timestamp|`
    pub recency_gap: Option<f64>,
    /// `|mean_dir - latest_dir|`
    pub agreement_distance: Option<f64>,
    /// Dispersion of the unit directions
    pub variance: Option<f64>,
}

/// Verdict plus the measurements that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub measurements: GateMeasurements,
}

impl Evaluation {
    pub fn rejected(reason: RejectReason, measurements: GateMeasurements) -> Self {
        Self {
            verdict: Verdict::Rejected(reason),
            measurements,
        }
    }

    pub fn accepted(measurements: GateMeasurements) -> Self {
        Self {
            verdict: Verdict::Accepted,
            measurements,
        }
    }
}
