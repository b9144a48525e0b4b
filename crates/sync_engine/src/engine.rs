//! Alignment engine driver
//!
//! Pulls merged events, feeds the accumulator, validates at every camera
//! image and hands accepted bundles to the sink.

use contracts::{
    AlignmentConfig, AlignmentReport, BundleSink, ContractError, Evaluation, InertialPolicy,
    Thresholds, TimedEvent, Verdict,
};
use observability::{
    AlignmentMetricsAggregator, MetricsSummary, record_bundle_written, record_evaluation,
    record_event_dispatched, record_source_stats, record_window_depth,
};
use tracing::{debug, info, instrument, warn};

use crate::accumulator::FrameAccumulator;
use crate::merge::MergeScheduler;
use crate::validator::GazeValidator;

/// Single-pass alignment over one session
#[derive(Debug)]
pub struct AlignmentEngine {
    accumulator: FrameAccumulator,
    validator: GazeValidator,
    aggregator: AlignmentMetricsAggregator,
    report: AlignmentReport,
    last_image: Option<u64>,
}

impl AlignmentEngine {
    pub fn new(thresholds: Thresholds, policy: InertialPolicy) -> Self {
        Self {
            accumulator: FrameAccumulator::new(thresholds.gaze_time_threshold, policy),
            validator: GazeValidator::new(thresholds),
            aggregator: AlignmentMetricsAggregator::new(),
            report: AlignmentReport::default(),
            last_image: None,
        }
    }

    pub fn from_config(config: &AlignmentConfig) -> Self {
        Self::new(config.thresholds, config.inertial.policy)
    }

    pub fn accumulator(&self) -> &FrameAccumulator {
        &self.accumulator
    }

    /// Counters so far
    pub fn report(&self) -> &AlignmentReport {
        &self.report
    }

    pub fn metrics_summary(&self) -> MetricsSummary {
        self.aggregator.summary()
    }

    /// Drive the merge to completion
    ///
    /// # Errors
    /// Only sink failures abort the run.
    #[instrument(name = "alignment_engine_run", skip_all, fields(sink = %sink.name()))]
    pub fn run<S>(
        &mut self,
        scheduler: &mut MergeScheduler,
        sink: &mut S,
    ) -> Result<AlignmentReport, ContractError>
    where
        S: BundleSink + ?Sized,
    {
        for event in scheduler.by_ref() {
            self.process(event, sink)?;
        }
        sink.flush()?;

        for (kind, stats) in scheduler.source_stats() {
            record_source_stats(kind, &stats);
            self.report.record_source_stats(kind, stats);
        }

        info!(
            images = self.report.images_seen,
            accepted = self.report.bundles_accepted,
            rejected = self.report.total_rejected(),
            skipped = self.report.total_skipped(),
            "alignment finished"
        );
        Ok(self.report.clone())
    }

    /// Apply one event; returns the evaluation when it was a camera image
    pub fn process<S>(
        &mut self,
        event: TimedEvent,
        sink: &mut S,
    ) -> Result<Option<Evaluation>, ContractError>
    where
        S: BundleSink + ?Sized,
    {
        let kind = event.kind();
        record_event_dispatched(kind);
        self.report.record_dispatch(kind);

        // ids arrive ascending; a repeat must not be evaluated or persisted again
        if let TimedEvent::CameraImage(image) = &event {
            if self.last_image.is_some_and(|id| id >= image.id) {
                warn!(image_id = image.id, "camera image already evaluated, skipping");
                self.report.record_duplicate();
                return Ok(None);
            }
        }

        let Some(image) = self.accumulator.apply(event) else {
            return Ok(None);
        };
        self.last_image = Some(image.id);
        self.report.record_image();

        let bundle = self.accumulator.bundle();
        let evaluation = self.validator.evaluate(bundle);
        let depth = bundle.gaze_snapshot().len();
        record_evaluation(&evaluation);
        record_window_depth(depth);
        self.aggregator.update(&evaluation, depth);

        match evaluation.verdict {
            Verdict::Rejected(reason) => {
                debug!(image_id = image.id, gate = %reason, "bundle rejected");
                self.report.record_rejection(reason);
            }
            Verdict::Accepted => {
                let Some(accepted) = bundle.accepted(evaluation.measurements) else {
                    return Ok(Some(evaluation));
                };
                match sink.write(&accepted) {
                    Ok(()) => record_bundle_written(sink.name(), true),
                    Err(e) => {
                        record_bundle_written(sink.name(), false);
                        return Err(e);
                    }
                }
                debug!(image_id = image.id, gaze_ts = accepted.gaze.timestamp, "bundle accepted");
                self.report.record_acceptance();
            }
        }

        Ok(Some(evaluation))
    }
}
