//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use super::resolve_config;
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub fn run_pipeline(args: &RunArgs) -> Result<()> {
    let alignment = resolve_config(&args.session)?;

    info!(
        session = %alignment.session.session_name(),
        camera_dir = %alignment.session.camera_dir.display(),
        eye_tracker_dir = %alignment.session.eye_tracker_dir.display(),
        output = %alignment.session.output_dir().display(),
        policy = ?alignment.inertial.policy,
        dry_run = args.dry_run,
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(PipelineConfig {
        alignment,
        dry_run: args.dry_run,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    let stats = pipeline.run().context("Alignment failed")?;

    info!(
        images = stats.report.images_seen,
        accepted = stats.report.bundles_accepted,
        duration_secs = stats.duration.as_secs_f64(),
        "Alignment completed successfully"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&stats.report)
            .context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    Ok(())
}
