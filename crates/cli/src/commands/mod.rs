//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::{AlignmentConfig, SessionConfig};
use tracing::info;

use crate::cli::SessionArgs;
use crate::error::CliError;

/// Build the effective configuration: file (if any), then CLI overrides,
/// then validation
pub(crate) fn resolve_config(args: &SessionArgs) -> Result<AlignmentConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path).into());
            }
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            let camera_dir = args
                .camera_dir
                .clone()
                .ok_or(CliError::missing_session_setting("camera-dir"))?;
            let eye_tracker_dir = args
                .eye_tracker_dir
                .clone()
                .ok_or(CliError::missing_session_setting("eye-tracker-dir"))?;
            let output = args
                .output
                .clone()
                .ok_or(CliError::missing_session_setting("output"))?;
            AlignmentConfig::for_session(SessionConfig::new(camera_dir, eye_tracker_dir, output))
        }
    };

    if let Some(dir) = &args.camera_dir {
        info!(camera_dir = %dir.display(), "Overriding camera directory from CLI");
        config.session.camera_dir = dir.clone();
    }
    if let Some(dir) = &args.eye_tracker_dir {
        info!(eye_tracker_dir = %dir.display(), "Overriding eye-tracker directory from CLI");
        config.session.eye_tracker_dir = dir.clone();
    }
    if let Some(dir) = &args.output {
        info!(output = %dir.display(), "Overriding output root from CLI");
        config.session.output_root = dir.clone();
    }
    if let Some(name) = &args.name {
        config.session.name = Some(name.clone());
    }

    config_loader::ConfigLoader::validate(&config).context("Invalid session configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_from_flags_only() {
        let args = SessionArgs {
            camera_dir: Some(PathBuf::from("rec/test/Kinect")),
            eye_tracker_dir: Some(PathBuf::from("rec/test/Glasses3")),
            output: Some(PathBuf::from("processed")),
            ..SessionArgs::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.session.session_name(), "test");
        assert_eq!(config.session.output_dir(), PathBuf::from("processed/test"));
    }

    #[test]
    fn test_resolve_requires_all_dirs_without_file() {
        let args = SessionArgs {
            camera_dir: Some(PathBuf::from("rec/test/Kinect")),
            ..SessionArgs::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().contains("eye-tracker-dir"));
    }

    #[test]
    fn test_resolve_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.toml");
        fs::write(
            &path,
            r#"
[session]
camera_dir = "a/Kinect"
eye_tracker_dir = "a/Glasses3"
output_root = "out"

[thresholds]
gaze_time_epsilon = 0.08
"#,
        )
        .unwrap();

        let args = SessionArgs {
            config: Some(path),
            output: Some(PathBuf::from("elsewhere")),
            name: Some("renamed".into()),
            ..SessionArgs::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.session.output_dir(), PathBuf::from("elsewhere/renamed"));
        assert_eq!(config.thresholds.gaze_time_epsilon, 0.08);
    }

    #[test]
    fn test_resolve_missing_file() {
        let args = SessionArgs {
            config: Some(PathBuf::from("/nonexistent/session.toml")),
            ..SessionArgs::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }
}
