//! Alignment metrics
//!
//! Recording helpers over the `metrics` facade, plus an in-memory aggregator
//! so a run summary can be printed without a Prometheus scrape.

use std::collections::BTreeMap;

use contracts::{Evaluation, RejectReason, SourceStats, StreamKind, Verdict};
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};

/// Kind of a published metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// Every metric the workspace publishes, with its help text
pub const METRIC_CATALOG: &[(&str, MetricKind, &str)] = &[
    ("gaze_align_events_total", MetricKind::Counter, "Merged events handed to the accumulator, per stream"),
    ("gaze_align_images_total", MetricKind::Counter, "Camera images evaluated"),
    ("gaze_align_bundles_accepted_total", MetricKind::Counter, "Bundles that passed all gates"),
    ("gaze_align_bundles_rejected_total", MetricKind::Counter, "Bundles rejected, per gate"),
    ("gaze_align_bundles_written_total", MetricKind::Counter, "Sink writes, per sink and status"),
    ("gaze_align_entries_skipped_total", MetricKind::Counter, "Unusable input entries, per stream"),
    ("gaze_align_out_of_order_total", MetricKind::Counter, "Records older than their predecessor, per stream"),
    ("gaze_align_gaze_pruned_total", MetricKind::Counter, "Gaze samples dropped from the window"),
    ("gaze_align_source_emitted", MetricKind::Gauge, "Events read from each source"),
    ("gaze_align_recency_gap_ms", MetricKind::Histogram, "Image to latest gaze gap in milliseconds"),
    ("gaze_align_agreement_distance", MetricKind::Histogram, "Mean to latest unit direction distance"),
    ("gaze_align_direction_variance", MetricKind::Histogram, "Dispersion of unit gaze directions"),
    ("gaze_align_window_depth", MetricKind::Histogram, "Gaze samples in the window at image time"),
];

/// Register help text for every catalog entry with the installed recorder
pub fn describe_metrics() {
    for &(name, kind, help) in METRIC_CATALOG {
        match kind {
            MetricKind::Counter => describe_counter!(name, help),
            MetricKind::Gauge => describe_gauge!(name, help),
            MetricKind::Histogram => describe_histogram!(name, help),
        }
    }
}

/// Record one event handed to the accumulator
pub fn record_event_dispatched(stream: StreamKind) {
    counter!("gaze_align_events_total", "stream" => stream.as_str()).increment(1);
}

/// Record the validator outcome for one camera image
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_evaluation;
///
/// let evaluation = validator.evaluate(&bundle);
/// record_evaluation(&evaluation);
/// ```
pub fn record_evaluation(evaluation: &Evaluation) {
    counter!("gaze_align_images_total").increment(1);

    match evaluation.verdict {
        Verdict::Accepted => {
            counter!("gaze_align_bundles_accepted_total").increment(1);
        }
        Verdict::Rejected(reason) => {
            counter!("gaze_align_bundles_rejected_total", "gate" => reason.as_str()).increment(1);
        }
    }

    let m = &evaluation.measurements;
    if let Some(gap) = m.recency_gap {
        histogram!("gaze_align_recency_gap_ms").record(gap * 1000.0);
    }
    if let Some(distance) = m.agreement_distance {
        histogram!("gaze_align_agreement_distance").record(distance);
    }
    if let Some(variance) = m.variance {
        histogram!("gaze_align_direction_variance").record(variance);
    }
}

/// Record the final read statistics of one source
pub fn record_source_stats(stream: StreamKind, stats: &SourceStats) {
    gauge!("gaze_align_source_emitted", "stream" => stream.as_str()).set(stats.emitted as f64);
    if stats.out_of_order > 0 {
        counter!("gaze_align_out_of_order_total", "stream" => stream.as_str())
            .increment(stats.out_of_order);
    }
}

/// Record a sink write
pub fn record_bundle_written(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "gaze_align_bundles_written_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Gaze window depth at image time
pub fn record_window_depth(depth: usize) {
    histogram!("gaze_align_window_depth").record(depth as f64);
}

/// Alignment metrics aggregator
///
/// Aggregates evaluations in memory.
#[derive(Debug, Clone, Default)]
pub struct AlignmentMetricsAggregator {
    /// Images evaluated
    pub total_images: u64,

    /// Bundles accepted
    pub total_accepted: u64,

    /// Rejections per gate
    pub rejected: BTreeMap<RejectReason, u64>,

    /// Recency gap (ms)
    pub recency_stats: RunningStats,

    /// Agreement distance
    pub agreement_stats: RunningStats,

    /// Direction variance
    pub variance_stats: RunningStats,

    /// Gaze window depth at image time
    pub window_stats: RunningStats,
}

impl AlignmentMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one evaluation in
    pub fn update(&mut self, evaluation: &Evaluation, window_depth: usize) {
        self.total_images += 1;
        match evaluation.verdict {
            Verdict::Accepted => self.total_accepted += 1,
            Verdict::Rejected(reason) => *self.rejected.entry(reason).or_insert(0) += 1,
        }

        let m = &evaluation.measurements;
        if let Some(gap) = m.recency_gap {
            self.recency_stats.push(gap * 1000.0);
        }
        if let Some(distance) = m.agreement_distance {
            self.agreement_stats.push(distance);
        }
        if let Some(variance) = m.variance {
            self.variance_stats.push(variance);
        }
        self.window_stats.push(window_depth as f64);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_images: self.total_images,
            total_accepted: self.total_accepted,
            acceptance_rate: if self.total_images > 0 {
                self.total_accepted as f64 / self.total_images as f64 * 100.0
            } else {
                0.0
            },
            rejected: self.rejected.clone(),
            recency_gap_ms: StatsSummary::from(&self.recency_stats),
            agreement_distance: StatsSummary::from(&self.agreement_stats),
            variance: StatsSummary::from(&self.variance_stats),
            window_depth: StatsSummary::from(&self.window_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_images: u64,
    pub total_accepted: u64,
    pub acceptance_rate: f64,
    pub rejected: BTreeMap<RejectReason, u64>,
    pub recency_gap_ms: StatsSummary,
    pub agreement_distance: StatsSummary,
    pub variance: StatsSummary,
    pub window_depth: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Alignment Metrics Summary ===")?;
        writeln!(f, "Images evaluated: {}", self.total_images)?;
        writeln!(
            f,
            "Bundles accepted: {} ({:.2}%)",
            self.total_accepted, self.acceptance_rate
        )?;
        if !self.rejected.is_empty() {
            writeln!(f, "Rejections:")?;
            for (gate, count) in &self.rejected {
                writeln!(f, "  {}: {}", gate, count)?;
            }
        }
        writeln!(f, "Recency gap (ms): {}", self.recency_gap_ms)?;
        writeln!(f, "Agreement distance: {}", self.agreement_distance)?;
        writeln!(f, "Direction variance: {}", self.variance)?;
        writeln!(f, "Window depth: {}", self.window_depth)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.4}, max={:.4}, mean={:.4}, std={:.4} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
