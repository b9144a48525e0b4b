//! BundleSink trait - Frame Persister interface

use crate::{CameraImage, ContractError, GateMeasurements, GazeSample, InertialSample, Vector3};

/// A validated bundle, borrowed from the accumulator for the duration of one write.
#[derive(Debug, Clone, Copy)]
pub struct AcceptedBundle<'a> {
    /// The camera image that closed this bundle
    pub image: CameraImage,

    /// Most recent gaze sample of the validated snapshot
    pub gaze: &'a GazeSample,

    /// Latest gyroscope sample, if any arrived yet
    pub inertial: Option<&'a InertialSample>,

    /// Integrated orientation (integrate policy only)
    pub orientation: Option<Vector3>,

    /// Decode index of the latest scene-video frame, if any
    pub scene_frame_index: Option<u64>,

    /// Gate measurements of the accepting evaluation
    pub measurements: GateMeasurements,
}

/// Bundle output trait
///
/// Implementations are side-effect only: they never feed state back into
/// the accumulator.
pub trait BundleSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist one accepted bundle
    ///
    /// # Errors
    /// Returns a persist error (should include context)
    fn write(&mut self, bundle: &AcceptedBundle<'_>) -> Result<(), ContractError>;

    /// Flush anything buffered
    fn flush(&mut self) -> Result<(), ContractError>;
}

impl<S: BundleSink + ?Sized> BundleSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write(&mut self, bundle: &AcceptedBundle<'_>) -> Result<(), ContractError> {
        (**self).write(bundle)
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        (**self).flush()
    }
}
