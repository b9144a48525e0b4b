//! Event sources
//!
//! Each source yields the events of one stream in non-decreasing timestamp
//! order (the camera source sorts; the record sources count violations).
//! Camera and record timestamps are seconds on the camera clock; scene video
//! frames carry their native millisecond position.

mod camera;
pub mod common;
mod gaze;
mod inertial;
mod video;

pub use camera::{CameraEntry, CameraImageSource, classify_entry};
pub use gaze::{GazeSource, parse_gaze_record};
pub use inertial::{InertialSource, parse_inertial_record};
pub use video::{DecodedFrame, FfmpegDecoder, FrameDecoder, SceneVideoSource, VideoProbe};
