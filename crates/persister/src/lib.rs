//! # Persister
//!
//! Frame Persister: writes accepted bundles to the output tree.
//!
//! Responsibilities:
//! - Mirror the camera capture (color image, optional depth) per accepted image
//! - Serialize the validated gaze sample and inertial state as sidecars
//! - Replace, never append to, an existing bundle directory
//!
//! Writes are side effects only; nothing flows back into the engine.

pub mod error;
pub mod layout;
pub mod metrics;
pub mod sidecar;
pub mod sinks;

pub use contracts::{AcceptedBundle, BundleSink};
pub use error::PersisterError;
pub use layout::CameraFiles;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink};
