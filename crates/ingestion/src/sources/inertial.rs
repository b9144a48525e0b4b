//! Inertial record source

use std::path::Path;

use contracts::{
    EventSource, InertialSample, SessionClockOffset, SourceStats, StreamKind, TimedEvent, Vector3,
};
use tracing::warn;

use super::common::{NdjsonReader, RawRecord, StreamCounters};
use crate::error::{IngestionError, Result};

/// Interpret one inertial line
///
/// Samples without a gyroscope reading (accelerometer or magnetometer only)
/// are still emitted; they carry the raw payload.
pub fn parse_inertial_record(line: &str) -> Result<InertialSample> {
    let record = RawRecord::parse(line)?;
    let timestamp = record.timestamp()?;
    let gyroscope = record.vector("gyroscope")?.map(Vector3::from);
    Ok(InertialSample {
        timestamp,
        gyroscope,
        raw: record.data,
    })
}

/// Inertial samples from the compressed IMU record file, rebased onto the
/// camera clock
pub struct InertialSource {
    reader: NdjsonReader,
    offset: SessionClockOffset,
    counters: StreamCounters,
}

impl InertialSource {
    pub fn open(path: &Path, offset: SessionClockOffset) -> Self {
        Self {
            reader: NdjsonReader::open(StreamKind::Inertial, path),
            offset,
            counters: StreamCounters::default(),
        }
    }

    pub fn empty() -> Self {
        Self {
            reader: NdjsonReader::empty(StreamKind::Inertial),
            offset: SessionClockOffset::default(),
            counters: StreamCounters::default(),
        }
    }
}

impl EventSource for InertialSource {
    fn kind(&self) -> StreamKind {
        StreamKind::Inertial
    }

    fn next_event(&mut self) -> Option<TimedEvent> {
        loop {
            let (line_no, line) = self.reader.next_line()?;
            match line.and_then(|l| parse_inertial_record(&l)) {
                Ok(mut sample) => {
                    sample.timestamp = self.offset.rebase(sample.timestamp);
                    self.counters.emitted(StreamKind::Inertial, sample.timestamp);
                    return Some(TimedEvent::Inertial(sample));
                }
                Err(IngestionError::Io(_)) => {
                    self.counters.skipped(StreamKind::Inertial);
                }
                Err(e) => {
                    warn!(line = line_no, error = %e, "malformed inertial record skipped");
                    self.counters.skipped(StreamKind::Inertial);
                }
            }
        }
    }

    fn stats(&self) -> SourceStats {
        self.counters.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::common::test_util::write_gz_lines;
    use tempfile::tempdir;

    #[test]
    fn test_parse_with_and_without_gyro() {
        let s = parse_inertial_record(
            r#"{"type":"imu","timestamp":1.0,"data":{"accelerometer":[0.0,9.8,0.0],"gyroscope":[1.0,2.0,3.0]}}"#,
        )
        .unwrap();
        assert!(s.has_gyro());
        assert_eq!(s.gyroscope, Some(Vector3::new(1.0, 2.0, 3.0)));

        let s = parse_inertial_record(r#"{"type":"imu","timestamp":1.1,"data":{"magnetometer":[1.0,0.0,0.0]}}"#)
            .unwrap();
        assert!(!s.has_gyro());
        assert!(s.raw.get("magnetometer").is_some());
    }

    #[test]
    fn test_parse_bad_gyro() {
        let err = parse_inertial_record(r#"{"timestamp":1.0,"data":{"gyroscope":[1.0,2.0]}}"#).unwrap_err();
        assert!(matches!(err, IngestionError::InvalidField { field: "gyroscope", .. }));
    }

    #[test]
    fn test_source_rebases() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("imudata.gz");
        write_gz_lines(
            &path,
            &[
                r#"{"timestamp":4.0,"data":{"gyroscope":[0.0,0.0,1.0]}}"#,
                r#"{"data":{"gyroscope":[0.0,0.0,1.0]}}"#,
                r#"{"timestamp":4.5,"data":{"accelerometer":[0.0,9.8,0.0]}}"#,
            ],
        );

        let mut source = InertialSource::open(&path, SessionClockOffset::from_seconds(-1.0));
        let first = source.next_event().unwrap();
        let second = source.next_event().unwrap();
        assert!(source.next_event().is_none());
        assert!((first.timestamp() - 5.0).abs() < 1e-9);
        assert!((second.timestamp() - 5.5).abs() < 1e-9);
        assert_eq!(source.stats().skipped, 1);
        assert_eq!(source.stats().emitted, 2);
    }
}
