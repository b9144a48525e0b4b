//! # Sync Engine
//!
//! Offline temporal alignment of one recording session.
//!
//! Responsibilities:
//! - k-way timestamp merge of the session streams
//! - rolling gaze window, latest inertial and video state per camera image
//! - three-gate gaze validation
//! - handing accepted bundles to a [`contracts::BundleSink`]
//!
//! ## Usage Example
//!
//! ```ignore
//! use sync_engine::{AlignmentEngine, MergeScheduler};
//!
//! let mut scheduler = MergeScheduler::new(sources.into_sources());
//! let mut engine = AlignmentEngine::from_config(&config);
//! let report = engine.run(&mut scheduler, &mut sink)?;
//! println!("{report}");
//! ```

mod accumulator;
mod engine;
mod merge;
mod validator;

pub use accumulator::{FrameAccumulator, FrameBundle};
pub use engine::AlignmentEngine;
pub use merge::MergeScheduler;
pub use validator::{GazeValidator, direction_variance, mean_direction, unit_direction};

// Re-export contracts types
pub use contracts::{AlignmentReport, Evaluation, RejectReason, Thresholds, Verdict};
