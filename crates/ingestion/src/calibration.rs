//! Clock Offset Calibrator
//!
//! Each recorder writes its wall-clock session start to `start_timestamp.txt`
//! as `YYYY-MM-DD HH:MM:SS.ffffff`. The offset between the two starts rebases
//! eye-tracker timestamps onto the camera clock.

use std::path::Path;

use chrono::NaiveDateTime;
use contracts::{ContractError, SessionClockOffset, SessionConfig};
use tracing::{debug, info};

/// Session start format. The fraction is optional: whole seconds are
/// written without it.
pub const SESSION_START_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse one session-start line
pub fn parse_session_start(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), SESSION_START_FORMAT)
}

/// Read and parse a session-start file (first non-empty line)
pub fn read_session_start(path: &Path) -> Result<NaiveDateTime, ContractError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ContractError::calibration(&display, format!("cannot read file: {e}")))?;

    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| ContractError::calibration(&display, "file is empty"))?;

    parse_session_start(line).map_err(|e| {
        ContractError::calibration(
            &display,
            format!("'{line}' does not match {SESSION_START_FORMAT}: {e}"),
        )
    })
}

/// Computes the per-session clock offset
pub struct ClockCalibrator;

impl ClockCalibrator {
    /// `eye_tracker_start - camera_start`, microsecond precision
    pub fn offset_between(
        camera_start: NaiveDateTime,
        eye_tracker_start: NaiveDateTime,
    ) -> Result<SessionClockOffset, ContractError> {
        let delta = eye_tracker_start.signed_duration_since(camera_start);
        let micros = delta.num_microseconds().ok_or_else(|| {
            ContractError::calibration(
                "session start",
                format!("offset between {camera_start} and {eye_tracker_start} overflows"),
            )
        })?;
        Ok(SessionClockOffset::from_micros(micros))
    }

    /// Read both start files and compute the offset
    ///
    /// # Errors
    /// Fails if either file is missing, empty or unparsable. No alignment is
    /// possible without a common origin, so callers treat this as fatal.
    pub fn calibrate(
        camera_start_path: &Path,
        eye_tracker_start_path: &Path,
    ) -> Result<SessionClockOffset, ContractError> {
        let camera_start = read_session_start(camera_start_path)?;
        let eye_tracker_start = read_session_start(eye_tracker_start_path)?;
        debug!(%camera_start, %eye_tracker_start, "session starts parsed");

        let offset = Self::offset_between(camera_start, eye_tracker_start)?;
        info!(offset_s = offset.seconds(), "clock offset calibrated");
        Ok(offset)
    }

    /// Calibrate using the start files of a configured session
    pub fn calibrate_session(session: &SessionConfig) -> Result<SessionClockOffset, ContractError> {
        Self::calibrate(
            &session.camera_start_path(),
            &session.eye_tracker_start_path(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_with_fraction() {
        let t = parse_session_start("2024-06-12 17:01:48.250000").unwrap();
        assert_eq!(t.to_string(), "2024-06-12 17:01:48.250");
    }

    #[test]
    fn test_parse_whole_seconds() {
        assert!(parse_session_start("2024-06-12 17:01:48").is_ok());
    }

    #[test]
    fn test_parse_rejects_other_format() {
        assert!(parse_session_start("2024-06-12T17:01:48.000Z").is_err());
        assert!(parse_session_start("12/06/2024 17:01:48").is_err());
    }

    #[test]
    fn test_offset_scenario() {
        let camera = parse_session_start("2024-06-12 17:01:48.000000").unwrap();
        let tracker = parse_session_start("2024-06-12 17:01:51.500000").unwrap();
        let offset = ClockCalibrator::offset_between(camera, tracker).unwrap();
        assert!((offset.seconds() - 3.5).abs() < 1e-9);
        assert!((offset.rebase(10.0) - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_offset_negative_when_tracker_started_first() {
        let camera = parse_session_start("2024-06-12 17:01:48.000001").unwrap();
        let tracker = parse_session_start("2024-06-12 17:01:48.000000").unwrap();
        let offset = ClockCalibrator::offset_between(camera, tracker).unwrap();
        assert!((offset.seconds() + 1e-6).abs() < 1e-12);
    }

    #[test]
    fn test_calibrate_from_files() {
        let dir = tempdir().unwrap();
        let camera = dir.path().join("camera.txt");
        let tracker = dir.path().join("tracker.txt");
        fs::write(&camera, "2024-06-12 17:01:48.000000\n").unwrap();
        fs::write(&tracker, "\n  2024-06-12 17:01:51.500000  \n").unwrap();

        let offset = ClockCalibrator::calibrate(&camera, &tracker).unwrap();
        assert!((offset.seconds() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_calibrate_missing_file() {
        let dir = tempdir().unwrap();
        let camera = dir.path().join("camera.txt");
        fs::write(&camera, "2024-06-12 17:01:48.000000").unwrap();

        let err = ClockCalibrator::calibrate(&camera, &dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ContractError::Calibration { .. }));
    }

    #[test]
    fn test_calibrate_empty_file() {
        let dir = tempdir().unwrap();
        let camera = dir.path().join("camera.txt");
        let tracker = dir.path().join("tracker.txt");
        fs::write(&camera, "2024-06-12 17:01:48.000000").unwrap();
        fs::write(&tracker, "   \n").unwrap();

        let err = ClockCalibrator::calibrate(&camera, &tracker).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_calibrate_garbage() {
        let dir = tempdir().unwrap();
        let camera = dir.path().join("camera.txt");
        let tracker = dir.path().join("tracker.txt");
        fs::write(&camera, "yesterday").unwrap();
        fs::write(&tracker, "2024-06-12 17:01:48.000000").unwrap();

        let err = ClockCalibrator::calibrate(&camera, &tracker).unwrap_err();
        assert!(matches!(err, ContractError::Calibration { .. }));
    }
}
