//! Gaze record source

use std::path::Path;

use contracts::{
    EventSource, GazeSample, SessionClockOffset, SourceStats, StreamKind, TimedEvent, Vector3,
};
use tracing::{debug, warn};

use super::common::{NdjsonReader, RawRecord, StreamCounters};
use crate::error::{IngestionError, Result};

/// Interpret one gaze line
///
/// Returns `Ok(None)` for a sample without a `gaze3d` measurement (blink,
/// tracking loss). Timestamps are still on the eye-tracker clock.
pub fn parse_gaze_record(line: &str) -> Result<Option<GazeSample>> {
    let record = RawRecord::parse(line)?;
    let timestamp = record.timestamp()?;
    let Some(direction) = record.vector("gaze3d")? else {
        return Ok(None);
    };
    Ok(Some(GazeSample {
        timestamp,
        direction: Vector3::from(direction),
        raw: record.data,
    }))
}

/// Gaze samples from the compressed gaze record file, rebased onto the
/// camera clock
pub struct GazeSource {
    reader: NdjsonReader,
    offset: SessionClockOffset,
    counters: StreamCounters,
}

impl GazeSource {
    pub fn open(path: &Path, offset: SessionClockOffset) -> Self {
        Self {
            reader: NdjsonReader::open(StreamKind::Gaze, path),
            offset,
            counters: StreamCounters::default(),
        }
    }

    pub fn empty() -> Self {
        Self {
            reader: NdjsonReader::empty(StreamKind::Gaze),
            offset: SessionClockOffset::default(),
            counters: StreamCounters::default(),
        }
    }
}

impl EventSource for GazeSource {
    fn kind(&self) -> StreamKind {
        StreamKind::Gaze
    }

    fn next_event(&mut self) -> Option<TimedEvent> {
        loop {
            let (line_no, line) = self.reader.next_line()?;
            let parsed = line.and_then(|l| parse_gaze_record(&l));
            match parsed {
                Ok(Some(mut sample)) => {
                    sample.timestamp = self.offset.rebase(sample.timestamp);
                    self.counters.emitted(StreamKind::Gaze, sample.timestamp);
                    return Some(TimedEvent::Gaze(sample));
                }
                Ok(None) => {
                    debug!(line = line_no, "gaze record without gaze3d skipped");
                    self.counters.skipped(StreamKind::Gaze);
                }
                Err(IngestionError::Io(_)) => {
                    self.counters.skipped(StreamKind::Gaze);
                }
                Err(e) => {
                    warn!(line = line_no, error = %e, "malformed gaze record skipped");
                    self.counters.skipped(StreamKind::Gaze);
                }
            }
        }
    }

    fn stats(&self) -> SourceStats {
        self.counters.stats()
    }
}
