//! # Observability
//!
//! Log and metric plumbing for the alignment tools.
//!
//! Logs always go to stderr so that `--json` reports on stdout stay
//! machine-readable. Metrics go through the `metrics` facade; without an
//! installed exporter every `record_*` call is a no-op, and the
//! [`AlignmentMetricsAggregator`] still gives the CLI its end-of-run summary.
//!
//! ```ignore
//! observability::init_with_config(ObservabilityConfig {
//!     log_format: LogFormat::Json,
//!     metrics_port: Some(9100),
//!     ..Default::default()
//! })?;
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::metrics::{
    AlignmentMetricsAggregator, METRIC_CATALOG, MetricKind, MetricsSummary, RunningStats,
    StatsSummary, describe_metrics, record_bundle_written, record_evaluation,
    record_event_dispatched, record_source_stats, record_window_depth,
};

/// Compact logs, no exporter
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus listen port; the engine is offline, so off unless asked for
    pub metrics_port: Option<u16>,
    /// Filter used when `RUST_LOG` is unset
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Compact,
            metrics_port: None,
            default_log_level: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Filter directive for a `-v`/`-q` count
    pub fn level_for_verbosity(verbose: u8, quiet: bool) -> &'static str {
        match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, with source locations
    Json,
    Pretty,
    #[default]
    Compact,
}

/// Install the subscriber and, when a port is set, the exporter
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    // exactly one of the three layers is Some
    let format = config.log_format;
    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
    });
    let pretty = (format == LogFormat::Pretty)
        .then(|| fmt::layer().pretty().with_writer(std::io::stderr));
    let compact = (format == LogFormat::Compact)
        .then(|| fmt::layer().compact().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .with(compact)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::debug!(?format, metrics_port = ?config.metrics_port, "observability ready");
    Ok(())
}

/// Install the Prometheus exporter and describe the published metrics
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus exporter on port {port}"))?;
    describe_metrics();

    tracing::info!(port, metrics = METRIC_CATALOG.len(), "Prometheus endpoint listening");
    Ok(())
}
