use crate::{Backend, Device, InferError, ModelSource, Session};
use deli_image::Frame;

use super::postprocess::postprocess;
use super::preprocess::preprocess;
use super::types::Pose;

/// Synchronous YOLO pose pipeline
///
/// Runs letterbox preprocessing, the model session and post-processing for a
/// single frame. Blocking; async callers go through `OnnxPoseAdapter`.
pub struct YoloPoseEstimator {
    session: Box<dyn Session>,
    conf_threshold: f32,
}

impl YoloPoseEstimator {
    /// Load `model` onto `device` through `backend`.
    ///
    /// Uses the default candidate threshold (conf=0.25).
    pub fn new(
        model: ModelSource,
        backend: &dyn Backend,
        device: &Device,
    ) -> Result<Self, InferError> {
        let session = backend.load_model(model, device)?;
        Ok(Self::from_session(session))
    }

    /// Wrap an already loaded session.
    pub fn from_session(session: Box<dyn Session>) -> Self {
        Self {
            session,
            conf_threshold: 0.25,
        }
    }

    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }

    /// Estimate the best-scoring pose in `frame`, in frame pixel coordinates.
    pub fn estimate(&mut self, frame: &Frame) -> Result<Pose, InferError> {
        let (input, letterbox) = preprocess(frame)?;

        let input_name = self
            .session
            .input_names()
            .first()
            .ok_or_else(|| InferError::Runtime("model has no inputs".to_string()))?
            .clone();

        let outputs = self.session.run(&[(input_name.as_str(), input)])?;

        let output = self
            .session
            .output_names()
            .first()
            .and_then(|name| outputs.get(name))
            .or_else(|| outputs.values().next())
            .ok_or_else(|| InferError::Runtime("model produced no outputs".to_string()))?;

        postprocess(output, &letterbox, self.conf_threshold)
    }
}
