//! EventSource trait - Stream Source abstraction
//!
//! Every session stream (camera images, gaze, inertial, scene video) is a
//! finite, lazily produced sequence of [`TimedEvent`]s in non-decreasing
//! timestamp order. Sources own their recoverable failures: a bad entry is
//! logged and counted, never returned as an error.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{StreamKind, TimedEvent};

/// Read statistics of one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Events produced
    pub emitted: u64,
    /// Entries skipped (malformed names, unparsable records, unreadable frames)
    pub skipped: u64,
    /// Records whose timestamp went backwards
    pub out_of_order: u64,
}

/// Stream source trait
///
/// # Example
///
/// ```ignore
/// let mut source: Box<dyn EventSource> = open_gaze_source(path, offset);
/// while let Some(event) = source.next_event() {
///     println!("{} at {}", event.kind(), event.timestamp());
/// }
/// ```
pub trait EventSource: Send {
    /// Which stream this source produces
    fn kind(&self) -> StreamKind;

    /// Pull the next event; `None` once exhausted
    fn next_event(&mut self) -> Option<TimedEvent>;

    /// Read statistics so far
    fn stats(&self) -> SourceStats;
}

/// Source that replays prepared events in the order given.
///
/// Used by tests and by callers that already hold a stream in memory.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    kind: StreamKind,
    events: VecDeque<TimedEvent>,
    emitted: u64,
}

impl ReplaySource {
    pub fn new(kind: StreamKind, events: impl IntoIterator<Item = TimedEvent>) -> Self {
        Self {
            kind,
            events: events.into_iter().collect(),
            emitted: 0,
        }
    }
}

impl EventSource for ReplaySource {
    fn kind(&self) -> StreamKind {
        self.kind
    }

    fn next_event(&mut self) -> Option<TimedEvent> {
        let event = self.events.pop_front()?;
        self.emitted += 1;
        Some(event)
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            emitted: self.emitted,
            ..SourceStats::default()
        }
    }
}
