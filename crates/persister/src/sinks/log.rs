//! LogSink - logs bundle summaries via tracing, writes nothing

use contracts::{AcceptedBundle, BundleSink, ContractError};
use tracing::{info, instrument};

use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// Dry-run sink
pub struct LogSink {
    name: String,
    metrics: SinkMetrics,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: SinkMetrics::new(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl BundleSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, bundle),
        fields(sink = %self.name, image_id = bundle.image.id)
    )]
    fn write(&mut self, bundle: &AcceptedBundle<'_>) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            image_id = bundle.image.id,
            image_ts = bundle.image.timestamp,
            gaze_ts = bundle.gaze.timestamp,
            gap = bundle.measurements.recency_gap,
            has_imu = bundle.inertial.is_some(),
            scene_frame = bundle.scene_frame_index,
            "bundle accepted"
        );
        self.metrics.inc_write_count();
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    fn flush(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, bundles = self.metrics.write_count(), "LogSink flushed");
        Ok(())
    }
}
