//! Gaze Validator
//!
//! Three sequential gates over the gaze snapshot taken at a camera image:
//! recency of the newest sample, agreement of the newest direction with the
//! window mean, and stability (dispersion) of the window. The first failing
//! gate decides the rejection.

use contracts::{Evaluation, GateMeasurements, GazeSample, RejectReason, Thresholds, Vector3};
use nalgebra::Vector3 as Direction;
use tracing::trace;

use crate::accumulator::FrameBundle;

/// Unit-length copy of a gaze direction
///
/// A zero vector has no direction and is returned unchanged.
pub fn unit_direction(v: Vector3) -> Direction<f64> {
    let d = Direction::new(v.x, v.y, v.z);
    d.try_normalize(0.0).unwrap_or(d)
}

/// Elementwise mean; zero for an empty slice
pub fn mean_direction(directions: &[Direction<f64>]) -> Direction<f64> {
    if directions.is_empty() {
        return Direction::zeros();
    }
    directions.iter().sum::<Direction<f64>>() / directions.len() as f64
}

/// Population variance of the direction set: mean squared distance to the
/// mean direction (sum of the per-axis variances)
pub fn direction_variance(directions: &[Direction<f64>]) -> f64 {
    if directions.is_empty() {
        return 0.0;
    }
    let mean = mean_direction(directions);
    directions
        .iter()
        .map(|d| (d - mean).norm_squared())
        .sum::<f64>()
        / directions.len() as f64
}

/// Acceptance gate
#[derive(Debug, Clone, Copy)]
pub struct GazeValidator {
    thresholds: Thresholds,
}

impl GazeValidator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Evaluate the bundle's current image against its snapshot
    pub fn evaluate(&self, bundle: &FrameBundle) -> Evaluation {
        self.evaluate_snapshot(
            bundle.current_image().map(|i| i.timestamp),
            bundle.gaze_snapshot(),
        )
    }

    /// Evaluate a snapshot for an image at `image_timestamp` (seconds)
    pub fn evaluate_snapshot(
        &self,
        image_timestamp: Option<f64>,
        snapshot: &[GazeSample],
    ) -> Evaluation {
        let mut m = GateMeasurements::default();

        let Some(image_timestamp) = image_timestamp else {
            return Evaluation::rejected(RejectReason::MissingImage, m);
        };
        let Some(latest) = snapshot.last() else {
            return Evaluation::rejected(RejectReason::EmptyWindow, m);
        };

        let gap = (image_timestamp - latest.timestamp).abs();
        m.recency_gap = Some(gap);
        let recent = gap <= self.thresholds.gaze_time_epsilon;
        if !recent {
            trace!(gap, "gaze rejected: recency");
            return Evaluation::rejected(RejectReason::Recency, m);
        }

        let directions: Vec<Direction<f64>> =
            snapshot.iter().map(|s| unit_direction(s.direction)).collect();
        let latest_dir = unit_direction(latest.direction);

        let distance = (mean_direction(&directions) - latest_dir).norm();
        m.agreement_distance = Some(distance);
        let agrees = distance <= self.thresholds.gaze_distance_epsilon;
        if !agrees {
            trace!(distance, "gaze rejected: agreement");
            return Evaluation::rejected(RejectReason::Agreement, m);
        }

        let variance = direction_variance(&directions);
        m.variance = Some(variance);
        let stable = variance <= self.thresholds.gaze_variance_epsilon;
        if !stable {
            trace!(variance, "gaze rejected: stability");
            return Evaluation::rejected(RejectReason::Stability, m);
        }

        Evaluation::accepted(m)
    }
}
