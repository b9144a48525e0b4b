//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{AlignmentConfig, Thresholds};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    session: String,
    output_dir: String,
    inertial_policy: String,
    video_enabled: bool,
    thresholds: Thresholds,
    inputs: Vec<InputFile>,
}

/// One input file the session will read, and whether it is there now
#[derive(Serialize)]
struct InputFile {
    role: &'static str,
    path: String,
    present: bool,
}

impl ConfigSummary {
    fn from_config(config: &AlignmentConfig) -> Self {
        let session = &config.session;
        let inputs = [
            ("camera start", session.camera_start_path()),
            ("eye-tracker start", session.eye_tracker_start_path()),
            ("gaze records", session.gaze_path()),
            ("inertial records", session.imu_path()),
            ("scene video", session.scene_video_path()),
        ]
        .into_iter()
        .map(|(role, path)| InputFile {
            role,
            present: path.is_file(),
            path: path.display().to_string(),
        })
        .collect();

        Self {
            version: format!("{:?}", config.version),
            session: session.session_name(),
            output_dir: session.output_dir().display().to_string(),
            inertial_policy: format!("{:?}", config.inertial.policy),
            video_enabled: config.video.enabled,
            thresholds: config.thresholds,
            inputs,
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary::from_config(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &AlignmentConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let session = &config.session;
    let t = &config.thresholds;

    if !session.camera_dir.is_dir() {
        warnings.push(format!(
            "camera_dir {} does not exist yet",
            session.camera_dir.display()
        ));
    }
    if !session.eye_tracker_dir.is_dir() {
        warnings.push(format!(
            "eye_tracker_dir {} does not exist yet",
            session.eye_tracker_dir.display()
        ));
    }
    if t.gaze_time_epsilon > t.gaze_time_threshold {
        warnings.push(format!(
            "gaze_time_epsilon ({}) exceeds gaze_time_threshold ({}); the recency gate can never reject a retained sample",
            t.gaze_time_epsilon, t.gaze_time_threshold
        ));
    }
    if t.gaze_time_threshold == 0.0 {
        warnings.push("gaze_time_threshold is 0; only exactly simultaneous gaze is kept".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Session: {}", summary.session);
            println!("  Output: {}", summary.output_dir);
            println!("  Inertial policy: {}", summary.inertial_policy);
            println!("  Scene video: {}", if summary.video_enabled { "enabled" } else { "disabled" });

            let t = &summary.thresholds;
            println!("\n  Thresholds:");
            println!("    window retention: {}s", t.gaze_time_threshold);
            println!("    recency: {}s", t.gaze_time_epsilon);
            println!("    agreement: {}", t.gaze_distance_epsilon);
            println!("    stability: {}", t.gaze_variance_epsilon);

            println!("\n  Inputs:");
            for input in &summary.inputs {
                let mark = if input.present { "ok" } else { "missing" };
                println!("    {:<18} {:<8} {}", input.role, mark, input.path);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
