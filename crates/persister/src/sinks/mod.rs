//! Sink implementations
//!
//! Contains FileSink and the dry-run LogSink.

mod file;
mod log;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
