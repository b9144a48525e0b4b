//! Merge Scheduler
//!
//! Streaming k-way merge over the session sources. Each step yields the
//! globally earliest pending event and refills only the lane it came from.

use std::cmp::Ordering;

use contracts::{EventSource, SourceStats, StreamKind, TimedEvent};
use tracing::debug;

/// One source plus its look-ahead event
struct Lane {
    source: Box<dyn EventSource>,
    pending: Option<TimedEvent>,
}

impl Lane {
    fn new(mut source: Box<dyn EventSource>) -> Self {
        let pending = source.next_event();
        Self { source, pending }
    }

    /// Exhausted lanes sort after everything
    fn head_timestamp(&self) -> f64 {
        self.pending
            .as_ref()
            .map(TimedEvent::timestamp)
            .unwrap_or(f64::INFINITY)
    }

    fn kind(&self) -> StreamKind {
        self.source.kind()
    }
}

/// K-way timestamp merge
///
/// Ties are broken by stream priority: camera image, gaze, inertial, scene
/// video. The merge ends once the camera image source is exhausted; events
/// of other streams past the last image are never yielded.
pub struct MergeScheduler {
    lanes: Vec<Lane>,
    dispatched: u64,
}

impl MergeScheduler {
    pub fn new(sources: Vec<Box<dyn EventSource>>) -> Self {
        let lanes = sources.into_iter().map(Lane::new).collect::<Vec<_>>();
        debug!(lanes = lanes.len(), "merge scheduler primed");
        Self {
            lanes,
            dispatched: 0,
        }
    }

    /// Events yielded so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// True while a camera image is still pending
    fn camera_pending(&self) -> bool {
        self.lanes
            .iter()
            .any(|lane| lane.kind() == StreamKind::CameraImage && lane.pending.is_some())
    }

    fn earliest_lane(&self) -> Option<usize> {
        self.lanes
            .iter()
            .enumerate()
            .filter(|(_, lane)| lane.pending.is_some())
            .min_by(|(_, a), (_, b)| compare_heads(a, b))
            .map(|(idx, _)| idx)
    }

    /// Read statistics of every source, in lane order
    pub fn source_stats(&self) -> Vec<(StreamKind, SourceStats)> {
        self.lanes
            .iter()
            .map(|lane| (lane.kind(), lane.source.stats()))
            .collect()
    }
}

fn compare_heads(a: &Lane, b: &Lane) -> Ordering {
    a.head_timestamp()
        .total_cmp(&b.head_timestamp())
        .then_with(|| a.kind().cmp(&b.kind()))
}

impl Iterator for MergeScheduler {
    type Item = TimedEvent;

    fn next(&mut self) -> Option<TimedEvent> {
        if !self.camera_pending() {
            return None;
        }
        let idx = self.earliest_lane()?;
        let lane = &mut self.lanes[idx];
        let event = lane.pending.take()?;
        lane.pending = lane.source.next_event();
        self.dispatched += 1;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CameraImage, GazeSample, InertialSample, ReplaySource, Vector3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn image(id: u64) -> TimedEvent {
        TimedEvent::CameraImage(CameraImage::from_id(id))
    }

    fn gaze(t: f64) -> TimedEvent {
        TimedEvent::Gaze(GazeSample {
            timestamp: t,
            direction: Vector3::new(0.0, 0.0, 1.0),
            raw: serde_json::Value::Null,
        })
    }

    fn inertial(t: f64) -> TimedEvent {
        TimedEvent::Inertial(InertialSample {
            timestamp: t,
            gyroscope: Some(Vector3::new(0.0, 0.0, 0.0)),
            raw: serde_json::Value::Null,
        })
    }

    fn source(kind: StreamKind, events: Vec<TimedEvent>) -> Box<dyn EventSource> {
        Box::new(ReplaySource::new(kind, events))
    }

    #[test]
    fn test_merges_in_time_order() {
        let scheduler = MergeScheduler::new(vec![
            source(StreamKind::CameraImage, vec![image(1_000_000), image(2_000_000)]),
            source(StreamKind::Gaze, vec![gaze(0.5), gaze(1.5)]),
            source(StreamKind::Inertial, vec![inertial(0.2), inertial(1.7)]),
        ]);
        let ts: Vec<f64> = scheduler.map(|e| e.timestamp()).collect();
        assert_eq!(ts, vec![0.2, 0.5, 1.0, 1.5, 1.7, 2.0]);
    }

    #[test]
    fn test_stops_when_camera_exhausted() {
        let mut scheduler = MergeScheduler::new(vec![
            source(StreamKind::Gaze, vec![gaze(0.5), gaze(1.5), gaze(2.5)]),
            source(StreamKind::CameraImage, vec![image(1_000_000)]),
        ]);
        let kinds: Vec<StreamKind> = scheduler.by_ref().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![StreamKind::Gaze, StreamKind::CameraImage]);
        assert!(scheduler.next().is_none());
        assert_eq!(scheduler.dispatched(), 2);
    }

    #[test]
    fn test_no_camera_source_yields_nothing() {
        let mut scheduler =
            MergeScheduler::new(vec![source(StreamKind::Gaze, vec![gaze(0.5)])]);
        assert!(scheduler.next().is_none());
    }

    #[test]
    fn test_tie_break_priority() {
        let scheduler = MergeScheduler::new(vec![
            source(StreamKind::Inertial, vec![inertial(1.0)]),
            source(StreamKind::Gaze, vec![gaze(1.0)]),
            source(StreamKind::CameraImage, vec![image(1_000_000), image(3_000_000)]),
        ]);
        let kinds: Vec<StreamKind> = scheduler.map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                StreamKind::CameraImage,
                StreamKind::Gaze,
                StreamKind::Inertial,
                StreamKind::CameraImage
            ]
        );
    }

    #[test]
    fn test_random_interleavings_are_ordered() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..200 {
            let mut sorted = |n: usize, scale: f64| {
                let mut v: Vec<f64> = (0..n).map(|_| rng.random::<f64>() * scale).collect();
                v.sort_by(f64::total_cmp);
                v
            };
            let cam = sorted(8, 10.0);
            let gz = sorted(40, 10.0);
            let imu = sorted(25, 10.0);

            let scheduler = MergeScheduler::new(vec![
                source(
                    StreamKind::CameraImage,
                    cam.iter()
                        .map(|t| image((t * 1e6).round() as u64))
                        .collect(),
                ),
                source(StreamKind::Gaze, gz.iter().copied().map(gaze).collect()),
                source(StreamKind::Inertial, imu.iter().copied().map(inertial).collect()),
            ]);

            let out: Vec<TimedEvent> = scheduler.collect();
            assert!(out.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
            let images = out
                .iter()
                .filter(|e| e.kind() == StreamKind::CameraImage)
                .count();
            assert_eq!(images, cam.len());
            assert_eq!(out.last().map(|e| e.kind()), Some(StreamKind::CameraImage));
        }
    }
}
