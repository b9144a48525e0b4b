//! # Ingestion
//!
//! Session stream readers.
//!
//! Responsibilities:
//! - Calibrate the eye-tracker clock against the camera clock
//! - List camera captures from either on-disk layout
//! - Decode the compressed gaze and inertial record files, rebasing timestamps
//! - Decode scene video frames
//!
//! Every reader implements [`contracts::EventSource`]. Recoverable problems
//! (a malformed entry, a missing optional stream) are logged, counted and
//! skipped; only calibration and the camera listing can fail a session.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::SessionSources;
//!
//! let sources = SessionSources::open(&config)?;
//! println!("offset: {}", sources.offset);
//! let streams = sources.into_sources();
//! ```

pub mod calibration;
pub mod error;
pub mod session;
pub mod sources;

pub use calibration::{ClockCalibrator, SESSION_START_FORMAT, parse_session_start, read_session_start};
pub use error::{IngestionError, Result};
pub use session::{SessionInventory, SessionSources};
pub use sources::{
    CameraEntry, CameraImageSource, DecodedFrame, FfmpegDecoder, FrameDecoder, GazeSource,
    InertialSource, SceneVideoSource, VideoProbe, classify_entry, parse_gaze_record,
    parse_inertial_record,
};
