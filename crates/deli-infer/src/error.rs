use crate::Device;
use deli_base::TensorError;
use std::fmt;

#[derive(Debug)]
pub enum InferError {
    Shape(String),
    Io(String),
    Runtime(String),
    /// The model could not be loaded on the selected device.
    ModelLoad(String),
    BackendUnavailable { device: Device, reason: String },
    UnknownDevice(String),
    UnknownBodyPart(String),
    Skeleton(String),
    /// An estimate was requested while another one is still running.
    Busy,
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::Shape(msg) => write!(f, "shape error: {msg}"),
            InferError::Io(msg) => write!(f, "io error: {msg}"),
            InferError::Runtime(msg) => write!(f, "runtime error: {msg}"),
            InferError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            InferError::BackendUnavailable { device, reason } => {
                write!(f, "backend unavailable on {device}: {reason}")
            }
            InferError::UnknownDevice(name) => write!(f, "unknown device identifier: {name}"),
            InferError::UnknownBodyPart(name) => write!(f, "unknown body part: {name}"),
            InferError::Skeleton(msg) => write!(f, "skeleton table error: {msg}"),
            InferError::Busy => write!(f, "an estimate is already in flight"),
        }
    }
}

impl std::error::Error for InferError {}

impl From<std::io::Error> for InferError {
    fn from(err: std::io::Error) -> Self {
        InferError::Io(err.to_string())
    }
}

impl From<TensorError> for InferError {
    fn from(err: TensorError) -> Self {
        InferError::Shape(err.to_string())
    }
}

impl From<serde_json::Error> for InferError {
    fn from(err: serde_json::Error) -> Self {
        InferError::Skeleton(err.to_string())
    }
}
