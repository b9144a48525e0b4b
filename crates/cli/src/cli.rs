//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Gaze Align - offline camera / eye-tracker session alignment
#[derive(Parser, Debug)]
#[command(
    name = "gaze-align",
    author,
    version,
    about = "Offline multi-sensor alignment and gaze validation",
    long_about = "Aligns a recorded camera session with a head-worn eye-tracker session.\n\n\
                  Rebases the eye-tracker clock, merges all streams in time order and \n\
                  writes one bundle per camera image whose gaze evidence passes validation."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GAZE_ALIGN_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "GAZE_ALIGN_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align one session and persist accepted bundles
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Show what a session contains
    Info(InfoArgs),
}

/// Session location overrides shared by `run` and `info`
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "GAZE_ALIGN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Camera session directory
    #[arg(long, env = "GAZE_ALIGN_CAMERA_DIR")]
    pub camera_dir: Option<PathBuf>,

    /// Eye-tracker session directory
    #[arg(long, env = "GAZE_ALIGN_EYE_TRACKER_DIR")]
    pub eye_tracker_dir: Option<PathBuf>,

    /// Output root; bundles go to `<output>/<session name>`
    #[arg(short, long, env = "GAZE_ALIGN_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Session name (defaults to the camera directory's parent name)
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Merge and validate, but only log accepted bundles
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "GAZE_ALIGN_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
