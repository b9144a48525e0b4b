//! Pipeline orchestrator - coordinates all components.
//!
//! calibrate -> open sources -> merge -> validate -> persist

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{AlignmentConfig, BundleSink};
use ingestion::SessionSources;
use persister::{FileSink, FileSinkConfig, LogSink};
use sync_engine::{AlignmentEngine, MergeScheduler};
use tracing::info;

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated session configuration
    pub alignment: AlignmentConfig,

    /// Log accepted bundles instead of writing them
    pub dry_run: bool,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let alignment = &self.config.alignment;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let sources = SessionSources::open(alignment).context("Failed to open session")?;
        let offset = sources.offset;
        let mut scheduler = MergeScheduler::new(sources.into_sources());
        let mut engine = AlignmentEngine::from_config(alignment);

        let (report, sink_metrics, output_dir) = if self.config.dry_run {
            let mut sink = LogSink::new("dry_run");
            let report = Self::drive(&mut engine, &mut scheduler, &mut sink)?;
            (report, sink.metrics(), None)
        } else {
            let output_dir = alignment.session.output_dir();
            let mut sink = FileSink::new(
                "file",
                FileSinkConfig {
                    camera_dir: alignment.session.camera_dir.clone(),
                    output_dir: output_dir.clone(),
                },
            )
            .map_err(|e| e.into_contract("file"))
            .with_context(|| format!("Failed to prepare {}", output_dir.display()))?;
            let report = Self::drive(&mut engine, &mut scheduler, &mut sink)?;
            (report, sink.metrics(), Some(output_dir))
        };

        Ok(PipelineStats {
            session: alignment.session.session_name(),
            offset,
            report,
            alignment_metrics: engine.metrics_summary(),
            sink_metrics,
            output_dir,
            duration: start_time.elapsed(),
        })
    }

    fn drive<S: BundleSink>(
        engine: &mut AlignmentEngine,
        scheduler: &mut MergeScheduler,
        sink: &mut S,
    ) -> Result<contracts::AlignmentReport> {
        info!(sink = sink.name(), "Starting alignment...");
        engine
            .run(scheduler, sink)
            .with_context(|| format!("Sink '{}' failed", sink.name()))
    }
}
