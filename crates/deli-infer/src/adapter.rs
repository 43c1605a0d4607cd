use crate::negotiate::negotiate;
use crate::pose::{Pose, YoloPoseEstimator};
use crate::{Backend, Device, InferError, ModelSource};
use deli_image::Frame;
use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Per-call estimation options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EstimateOptions {
    /// Reflect x coordinates, for selfie-style display.
    pub mirror_horizontally: bool,
}

/// Asynchronous single-subject pose estimation.
///
/// The returned future owns everything it needs, so it can be held across
/// loop iterations while the caller keeps using the estimator's owner.
pub trait PoseEstimator {
    fn estimate(
        &mut self,
        frame: Frame,
        options: EstimateOptions,
    ) -> LocalBoxFuture<'static, Result<Pose, InferError>>;
}

/// What to load and where to try running it.
#[derive(Debug, Clone)]
pub struct CapabilityConfig {
    model: ModelSource,
    backends: Vec<Device>,
    conf_threshold: f32,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            model: ModelSource::File(PathBuf::from("models/yolov8n-pose.onnx")),
            backends: vec![
                Device::TensorRt {
                    device_id: 0,
                    fp16: false,
                },
                Device::Cuda { device_id: 0 },
                Device::Cpu,
            ],
            conf_threshold: 0.25,
        }
    }
}

impl CapabilityConfig {
    pub fn with_model(mut self, model: ModelSource) -> Self {
        self.model = model;
        self
    }

    /// Backend preference order, most preferred first.
    pub fn with_backends(mut self, backends: Vec<Device>) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn model(&self) -> &ModelSource {
        &self.model
    }

    pub fn backends(&self) -> &[Device] {
        &self.backends
    }

    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }
}

/// Async wrapper around a [`YoloPoseEstimator`].
///
/// Each call runs the model on tokio's blocking pool. The estimator is moved
/// out for the duration of the call, so a second call made before the first
/// finishes fails with `InferError::Busy`.
pub struct OnnxPoseAdapter {
    slot: Arc<Mutex<Option<YoloPoseEstimator>>>,
    device: Device,
}

impl OnnxPoseAdapter {
    pub fn from_estimator(estimator: YoloPoseEstimator, device: Device) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(estimator))),
            device,
        }
    }

    /// Load the model with ONNX Runtime on the first usable backend in `config`.
    #[cfg(feature = "onnx")]
    pub async fn initialize(config: CapabilityConfig) -> Result<Self, InferError> {
        Self::initialize_with(crate::backends::OnnxBackend::new(), config).await
    }

    /// Negotiate a device with `backend` and load the model on the blocking pool.
    ///
    /// Any failure to load is reported as `InferError::ModelLoad`.
    pub async fn initialize_with<B: Backend + 'static>(
        backend: B,
        config: CapabilityConfig,
    ) -> Result<Self, InferError> {
        let device = negotiate(config.backends(), |d| backend.probe(d));
        log::info!("loading {} on {} via {}", config.model(), device, backend.name());

        let model = config.model().clone();
        let load_device = device.clone();
        let estimator = tokio::task::spawn_blocking(move || {
            YoloPoseEstimator::new(model, &backend, &load_device)
        })
        .await
        .map_err(|e| InferError::ModelLoad(format!("load task failed: {e}")))?
        .map_err(|e| match e {
            InferError::ModelLoad(_) => e,
            other => InferError::ModelLoad(other.to_string()),
        })?
        .with_conf_threshold(config.conf_threshold());

        Ok(Self::from_estimator(estimator, device))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// True while an estimate is running.
    pub fn is_busy(&self) -> bool {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).is_none()
    }
}

/// An estimator checked out of the adapter for one call.
///
/// Dropping the lease puts the estimator back, whether the call finished,
/// panicked, or never ran.
struct Lease {
    slot: Arc<Mutex<Option<YoloPoseEstimator>>>,
    estimator: Option<YoloPoseEstimator>,
}

impl Lease {
    fn estimate(&mut self, frame: &Frame) -> Result<Pose, InferError> {
        match self.estimator.as_mut() {
            Some(estimator) => estimator.estimate(frame),
            None => Err(InferError::Busy),
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(estimator) = self.estimator.take() {
            *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(estimator);
        }
    }
}

impl PoseEstimator for OnnxPoseAdapter {
    /// Starts the model call on the blocking pool before returning, so the
    /// call runs to completion even if the returned future is dropped.
    fn estimate(
        &mut self,
        frame: Frame,
        options: EstimateOptions,
    ) -> LocalBoxFuture<'static, Result<Pose, InferError>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                return future::ready(Err(InferError::Runtime(format!("no tokio runtime: {e}"))))
                    .boxed_local();
            }
        };

        let taken = self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(estimator) = taken else {
            return future::ready(Err(InferError::Busy)).boxed_local();
        };
        let mut lease = Lease {
            slot: Arc::clone(&self.slot),
            estimator: Some(estimator),
        };

        let width = frame.width();
        let task = runtime.spawn_blocking(move || lease.estimate(&frame));

        async move {
            let result = task
                .await
                .map_err(|e| InferError::Runtime(format!("estimate task failed: {e}")))??;

            if options.mirror_horizontally {
                Ok(result.mirrored(width))
            } else {
                Ok(result)
            }
        }
        .boxed_local()
    }
}
