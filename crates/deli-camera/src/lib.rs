//! Camera capture for the deli pose pipeline.
//!
//! The `Camera` trait exposes a live stream as RGB [`deli_image::Frame`]s, both
//! as an async "next frame" and as a non-blocking "latest frame" accessor.
//! Backends hold the device exclusively and release it when dropped.

pub mod config;
pub mod error;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::{CameraConfig, PixelFormat};
pub use error::CameraError;
pub use traits::Camera;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
