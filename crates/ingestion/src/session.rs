//! Session wiring: calibrate, then open every stream of one recording

use contracts::{
    AlignmentConfig, ContractError, EventSource, SessionClockOffset, SourceStats, TimedEvent,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::calibration::ClockCalibrator;
use crate::sources::{CameraImageSource, GazeSource, InertialSource, SceneVideoSource};

/// All sources of one session, ready for merging
pub struct SessionSources {
    pub offset: SessionClockOffset,
    pub camera: CameraImageSource,
    pub gaze: GazeSource,
    pub inertial: InertialSource,
    pub video: SceneVideoSource,
}

impl SessionSources {
    /// Calibrate the clock offset and open all streams
    ///
    /// # Errors
    /// Calibration failure and an unreadable camera directory are fatal.
    /// Missing record files and scene video only produce warnings.
    #[instrument(name = "session_open", skip(config), fields(session = %config.session.session_name()))]
    pub fn open(config: &AlignmentConfig) -> Result<Self, ContractError> {
        let offset = ClockCalibrator::calibrate_session(&config.session)?;
        Self::open_with_offset(config, offset)
    }

    /// Open all streams with a known offset
    pub fn open_with_offset(
        config: &AlignmentConfig,
        offset: SessionClockOffset,
    ) -> Result<Self, ContractError> {
        let session = &config.session;
        let camera = CameraImageSource::open(&session.camera_dir, &session.files.start_timestamp)?;
        let gaze = GazeSource::open(&session.gaze_path(), offset);
        let inertial = InertialSource::open(&session.imu_path(), offset);
        let video = SceneVideoSource::open(&session.scene_video_path(), &config.video);
        info!(%offset, images = camera.remaining(), "session sources opened");

        Ok(Self {
            offset,
            camera,
            gaze,
            inertial,
            video,
        })
    }

    /// Sources in merge order
    pub fn into_sources(self) -> Vec<Box<dyn EventSource>> {
        vec![
            Box::new(self.camera),
            Box::new(self.gaze),
            Box::new(self.inertial),
            Box::new(self.video),
        ]
    }
}

/// What a session directory contains, without aligning anything
#[derive(Debug, Clone, Serialize)]
pub struct SessionInventory {
    pub session: String,
    /// `None` when calibration failed; see `calibration_error`
    pub offset_s: Option<f64>,
    pub calibration_error: Option<String>,
    pub camera: SourceStats,
    pub gaze: SourceStats,
    pub inertial: SourceStats,
    /// Inertial samples carrying a gyroscope reading
    pub inertial_with_gyro: u64,
    pub scene_video_present: bool,
}

impl SessionInventory {
    /// Read every record stream once and count
    pub fn scan(config: &AlignmentConfig) -> Result<Self, ContractError> {
        let session = &config.session;
        let (offset, calibration_error) = match ClockCalibrator::calibrate_session(session) {
            Ok(offset) => (Some(offset), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let rebase = offset.unwrap_or_default();

        let mut camera =
            CameraImageSource::open(&session.camera_dir, &session.files.start_timestamp)?;
        let mut gaze = GazeSource::open(&session.gaze_path(), rebase);
        let mut inertial = InertialSource::open(&session.imu_path(), rebase);

        let mut inertial_with_gyro = 0;
        while let Some(event) = inertial.next_event() {
            if matches!(&event, TimedEvent::Inertial(s) if s.has_gyro()) {
                inertial_with_gyro += 1;
            }
        }

        Ok(Self {
            session: session.session_name(),
            offset_s: offset.map(|o| o.seconds()),
            calibration_error,
            camera: drain(&mut camera),
            gaze: drain(&mut gaze),
            inertial: inertial.stats(),
            inertial_with_gyro,
            scene_video_present: session.scene_video_path().is_file(),
        })
    }
}

fn drain(source: &mut dyn EventSource) -> SourceStats {
    while source.next_event().is_some() {}
    source.stats()
}
