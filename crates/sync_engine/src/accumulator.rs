//! Frame Accumulator
//!
//! Rolling per-session state between camera images. Gaze samples queue up
//! until a camera image prunes the stale ones and freezes a snapshot for the
//! validator; inertial and video state is latest-value-wins.

use std::collections::VecDeque;

use contracts::{
    AcceptedBundle, CameraImage, GateMeasurements, GazeSample, InertialPolicy, InertialSample,
    SceneFrame, TimedEvent, Vector3,
};
use tracing::trace;

/// Live bundle state, overwritten in place per camera image
#[derive(Debug, Clone, Default)]
pub struct FrameBundle {
    current_image: Option<CameraImage>,
    gaze_window: VecDeque<GazeSample>,
    gaze_snapshot: Vec<GazeSample>,
    latest_inertial: Option<InertialSample>,
    orientation: Option<Vector3>,
    last_gyro_timestamp: Option<f64>,
    latest_video_frame: Option<SceneFrame>,
}

impl FrameBundle {
    pub fn current_image(&self) -> Option<CameraImage> {
        self.current_image
    }

    pub fn gaze_window(&self) -> &VecDeque<GazeSample> {
        &self.gaze_window
    }

    /// Copy of the window taken at the last camera image
    pub fn gaze_snapshot(&self) -> &[GazeSample] {
        &self.gaze_snapshot
    }

    /// Most recent sample of the snapshot
    pub fn latest_gaze(&self) -> Option<&GazeSample> {
        self.gaze_snapshot.last()
    }

    pub fn latest_inertial(&self) -> Option<&InertialSample> {
        self.latest_inertial.as_ref()
    }

    /// Integrated gyroscope orientation (integrate policy only)
    pub fn orientation(&self) -> Option<Vector3> {
        self.orientation
    }

    pub fn latest_video_frame(&self) -> Option<&SceneFrame> {
        self.latest_video_frame.as_ref()
    }

    /// Borrow the bundle for persistence; `None` without an image or gaze
    pub fn accepted(&self, measurements: GateMeasurements) -> Option<AcceptedBundle<'_>> {
        Some(AcceptedBundle {
            image: self.current_image?,
            gaze: self.latest_gaze()?,
            inertial: self.latest_inertial.as_ref(),
            orientation: self.orientation,
            scene_frame_index: self.latest_video_frame.as_ref().map(|f| f.index),
            measurements,
        })
    }
}

/// Applies dispatched events to the [`FrameBundle`]
#[derive(Debug)]
pub struct FrameAccumulator {
    bundle: FrameBundle,
    gaze_time_threshold: f64,
    policy: InertialPolicy,
    pruned: u64,
}

impl FrameAccumulator {
    pub fn new(gaze_time_threshold: f64, policy: InertialPolicy) -> Self {
        Self {
            bundle: FrameBundle::default(),
            gaze_time_threshold,
            policy,
            pruned: 0,
        }
    }

    pub fn bundle(&self) -> &FrameBundle {
        &self.bundle
    }

    /// Gaze samples discarded as stale so far
    pub fn pruned(&self) -> u64 {
        self.pruned
    }

    /// Apply one event
    ///
    /// Returns the image when the event was a camera image; the snapshot is
    /// then ready for validation.
    pub fn apply(&mut self, event: TimedEvent) -> Option<CameraImage> {
        match event {
            TimedEvent::Gaze(sample) => {
                self.bundle.gaze_window.push_back(sample);
                None
            }
            TimedEvent::Inertial(sample) => {
                self.on_inertial(sample);
                None
            }
            TimedEvent::SceneVideo(frame) => {
                self.bundle.latest_video_frame = Some(frame);
                None
            }
            TimedEvent::CameraImage(image) => {
                self.on_image(image);
                Some(image)
            }
        }
    }

    fn on_inertial(&mut self, sample: InertialSample) {
        let Some(gyro) = sample.gyroscope else {
            return;
        };

        if self.policy == InertialPolicy::Integrate {
            let orientation = self.bundle.orientation.get_or_insert(Vector3::default());
            if let Some(prev) = self.bundle.last_gyro_timestamp {
                // out-of-order samples leave the orientation untouched
                let dt = (sample.timestamp - prev).max(0.0);
                orientation.x += dt * gyro.x;
                orientation.y += dt * gyro.y;
                orientation.z += dt * gyro.z;
            }
            self.bundle.last_gyro_timestamp = Some(sample.timestamp);
        }

        self.bundle.latest_inertial = Some(sample);
    }

    fn on_image(&mut self, image: CameraImage) {
        self.bundle.current_image = Some(image);

        let threshold = self.gaze_time_threshold;
        let before = self.bundle.gaze_window.len();
        while let Some(oldest) = self.bundle.gaze_window.front() {
            if (image.timestamp - oldest.timestamp).abs() > threshold {
                self.bundle.gaze_window.pop_front();
            } else {
                break;
            }
        }
        let pruned = before - self.bundle.gaze_window.len();
        if pruned > 0 {
            self.pruned += pruned as u64;
            metrics::counter!("gaze_align_gaze_pruned_total").increment(pruned as u64);
        }

        self.bundle.gaze_snapshot.clear();
        self.bundle
            .gaze_snapshot
            .extend(self.bundle.gaze_window.iter().cloned());
        trace!(
            image_id = image.id,
            pruned,
            window = self.bundle.gaze_snapshot.len(),
            "gaze snapshot taken"
        );
    }
}
