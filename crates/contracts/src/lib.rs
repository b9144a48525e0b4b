//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only, never on each other's internals.
//!
//! ## Time Model
//! - The camera clock (seconds, f64) is the primary clock
//! - Eye-tracker gaze and inertial timestamps are rebased onto it by
//!   subtracting the [`SessionClockOffset`]
//! - Scene-video frames keep their own millisecond clock and are never rebased

mod clock;
mod config;
mod error;
mod event;
mod report;
mod sink;
mod source;
mod verdict;

pub use clock::SessionClockOffset;
pub use config::*;
pub use error::*;
pub use event::*;
pub use report::*;
pub use sink::{AcceptedBundle, BundleSink};
pub use source::{EventSource, ReplaySource, SourceStats};
pub use verdict::*;
