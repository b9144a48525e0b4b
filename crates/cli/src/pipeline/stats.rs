//! Pipeline statistics.

use std::path::PathBuf;
use std::time::Duration;

use contracts::{AlignmentReport, SessionClockOffset};
use observability::MetricsSummary;
use persister::MetricsSnapshot;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Session name
    pub session: String,

    /// Calibrated eye-tracker offset
    pub offset: SessionClockOffset,

    /// Engine counters
    pub report: AlignmentReport,

    /// Gate measurement statistics
    pub alignment_metrics: MetricsSummary,

    /// Sink write counters
    pub sink_metrics: MetricsSnapshot,

    /// Output session directory (None for dry runs)
    pub output_dir: Option<PathBuf>,

    /// Total duration of the run
    pub duration: Duration,
}

impl PipelineStats {
    /// Camera images processed per second
    pub fn images_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.report.images_seen as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Session: {} ===\n", self.session);
        println!("Clock offset: {}", self.offset);
        println!("Duration: {:.2}s ({:.1} images/s)", self.duration.as_secs_f64(), self.images_per_sec());
        match &self.output_dir {
            Some(dir) => println!("Output: {}", dir.display()),
            None => println!("Output: none (dry run)"),
        }
        println!("Sink: {}\n", self.sink_metrics);

        print!("{}", self.report);
        println!();
        print!("{}", self.alignment_metrics);
        println!();
    }
}
