//! Pose inference for the deli camera pipeline.
//!
//! `YoloPoseEstimator` is the blocking core: letterbox, run a [`Session`],
//! pick the best candidate. `OnnxPoseAdapter` makes it asynchronous and
//! guarantees one call at a time. Model runtimes plug in through [`Backend`].

pub mod adapter;
pub mod backend;
pub mod backends;
pub mod device;
pub mod error;
pub mod modelsource;
pub mod negotiate;
pub mod pose;
pub mod session;

pub use adapter::{CapabilityConfig, EstimateOptions, OnnxPoseAdapter, PoseEstimator};
pub use backend::Backend;
pub use device::{Device, parse_device_list};
pub use error::InferError;
pub use modelsource::ModelSource;
pub use negotiate::negotiate;
pub use pose::{
    BODY_PART_COUNT, BodyPart, Connection, ConnectionTable, Keypoint, LetterboxInfo, Pose,
    YoloPoseEstimator,
};
pub use session::Session;

#[cfg(feature = "onnx")]
pub use backends::OnnxBackend;
