//! Configuration validation
//!
//! Rules:
//! - every threshold finite and >= 0
//! - session directories non-empty
//! - output root distinct from both input directories
//! - session file names non-empty

use contracts::{AlignmentConfig, ContractError};

/// Validate an AlignmentConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &AlignmentConfig) -> Result<(), ContractError> {
    validate_thresholds(config)?;
    validate_session_dirs(config)?;
    validate_session_files(config)?;
    validate_video(config)?;
    Ok(())
}

fn validate_thresholds(config: &AlignmentConfig) -> Result<(), ContractError> {
    let t = &config.thresholds;
    let fields = [
        ("gaze_time_threshold", t.gaze_time_threshold),
        ("gaze_time_epsilon", t.gaze_time_epsilon),
        ("gaze_distance_epsilon", t.gaze_distance_epsilon),
        ("gaze_variance_epsilon", t.gaze_variance_epsilon),
    ];
    for (name, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(ContractError::config_validation(
                format!("thresholds.{name}"),
                format!("must be a finite value >= 0, got {value}"),
            ));
        }
    }
    Ok(())
}

fn validate_session_dirs(config: &AlignmentConfig) -> Result<(), ContractError> {
    let session = &config.session;
    let dirs = [
        ("session.camera_dir", &session.camera_dir),
        ("session.eye_tracker_dir", &session.eye_tracker_dir),
        ("session.output_root", &session.output_root),
    ];
    for (field, dir) in dirs {
        if dir.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "directory cannot be empty",
            ));
        }
    }

    if session.output_root == session.camera_dir || session.output_root == session.eye_tracker_dir
    {
        return Err(ContractError::config_validation(
            "session.output_root",
            format!(
                "output_root '{}' must differ from the input directories",
                session.output_root.display()
            ),
        ));
    }
    Ok(())
}

fn validate_session_files(config: &AlignmentConfig) -> Result<(), ContractError> {
    let files = &config.session.files;
    let names = [
        ("session.files.gaze", &files.gaze),
        ("session.files.imu", &files.imu),
        ("session.files.scene_video", &files.scene_video),
        ("session.files.start_timestamp", &files.start_timestamp),
    ];
    for (field, name) in names {
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "file name cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_video(config: &AlignmentConfig) -> Result<(), ContractError> {
    if !config.video.enabled {
        return Ok(());
    }
    if config.video.ffmpeg.trim().is_empty() || config.video.ffprobe.trim().is_empty() {
        return Err(ContractError::config_validation(
            "video",
            "ffmpeg and ffprobe must be set when video decoding is enabled",
        ));
    }
    Ok(())
}
