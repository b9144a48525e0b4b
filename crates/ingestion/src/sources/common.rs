//! Shared plumbing for the compressed record streams

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use contracts::{SourceStats, StreamKind};
use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{IngestionError, Result};

/// Skip counter shared by every source
#[inline]
pub fn record_skipped(stream: StreamKind) {
    metrics::counter!("gaze_align_entries_skipped_total", "stream" => stream.as_str())
        .increment(1);
}

/// One line of a record stream, before stream-specific interpretation
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Seconds since eye-tracker session start
    #[serde(default)]
    pub timestamp: Option<f64>,

    /// Payload; `{}` marks a sample without a measurement
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawRecord {
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn timestamp(&self) -> Result<f64> {
        let ts = self
            .timestamp
            .ok_or(IngestionError::MissingField { field: "timestamp" })?;
        if !ts.is_finite() {
            return Err(IngestionError::invalid_field("timestamp", "not finite"));
        }
        Ok(ts)
    }

    /// Read a three-component vector from `data.<field>`
    ///
    /// `Ok(None)` when the field is absent.
    pub fn vector(&self, field: &'static str) -> Result<Option<[f64; 3]>> {
        match self.data.get(field) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => {
                let v: [f64; 3] = serde_json::from_value(value.clone())
                    .map_err(|e| IngestionError::invalid_field(field, e.to_string()))?;
                if v.iter().any(|c| !c.is_finite()) {
                    return Err(IngestionError::invalid_field(field, "non-finite component"));
                }
                Ok(Some(v))
            }
        }
    }
}

/// Line reader over a gzip-compressed newline-delimited JSON file
///
/// A missing file reads as an empty stream. A line that is not UTF-8 is
/// reported on its own and reading continues; a decompression or IO failure
/// ends the stream after counting one skipped entry.
pub struct NdjsonReader {
    stream: StreamKind,
    reader: Option<BufReader<GzDecoder<File>>>,
    buf: Vec<u8>,
    line_no: u64,
}

impl NdjsonReader {
    pub fn open(stream: StreamKind, path: &Path) -> Self {
        let reader = match File::open(path) {
            Ok(file) => {
                debug!(stream = %stream, path = %path.display(), "record file opened");
                Some(BufReader::new(GzDecoder::new(file)))
            }
            Err(e) => {
                warn!(
                    stream = %stream,
                    path = %path.display(),
                    error = %e,
                    "record file unavailable, stream will be empty"
                );
                None
            }
        };
        Self {
            stream,
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// An already exhausted reader
    pub fn empty(stream: StreamKind) -> Self {
        Self {
            stream,
            reader: None,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// Next non-blank line with its 1-based line number
    ///
    /// `Some((n, Err(IngestionError::Utf8 { .. })))` reports one undecodable
    /// line. `Some((n, Err(IngestionError::Io(_))))` reports an unreadable
    /// remainder; the reader is exhausted afterwards.
    pub fn next_line(&mut self) -> Option<(u64, Result<String>)> {
        loop {
            let reader = self.reader.as_mut()?;
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {
                    self.line_no += 1;
                    let bytes = std::mem::take(&mut self.buf);
                    match String::from_utf8(bytes) {
                        Ok(mut line) => {
                            let len = line.trim_end_matches(|c| c == '\n' || c == '\r').len();
                            line.truncate(len);
                            if line.trim().is_empty() {
                                continue;
                            }
                            return Some((self.line_no, Ok(line)));
                        }
                        Err(e) => {
                            return Some((
                                self.line_no,
                                Err(IngestionError::Utf8 {
                                    valid_up_to: e.utf8_error().valid_up_to(),
                                }),
                            ));
                        }
                    }
                }
                Err(e) => {
                    self.line_no += 1;
                    self.reader = None;
                    warn!(
                        stream = %self.stream,
                        line = self.line_no,
                        error = %e,
                        "record file unreadable, ending stream"
                    );
                    return Some((self.line_no, Err(IngestionError::Io(e))));
                }
            }
        }
    }
}

/// Emission bookkeeping for a source
#[derive(Debug, Default)]
pub struct StreamCounters {
    stats: SourceStats,
    last_timestamp: Option<f64>,
}

impl StreamCounters {
    /// Count an emitted event, flagging a timestamp that goes backwards
    pub fn emitted(&mut self, stream: StreamKind, timestamp: f64) {
        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                self.stats.out_of_order += 1;
                warn!(stream = %stream, timestamp, previous = last, "out-of-order record");
            }
        }
        self.last_timestamp = Some(timestamp);
        self.stats.emitted += 1;
    }

    pub fn skipped(&mut self, stream: StreamKind) {
        self.stats.skipped += 1;
        record_skipped(stream);
    }

    pub fn stats(&self) -> SourceStats {
        self.stats
    }
}
