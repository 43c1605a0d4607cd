//! Frame handling for the deli camera pipeline.
//!
//! A [`Frame`] is an RGB8 image in HWC layout (`[height, width, 3]`) backed by a
//! `Tensor<u8>` from `deli-base`. This crate decodes camera payloads into frames
//! and packs RGB data for display.

pub mod convert;
pub mod error;
pub mod frame;

pub use convert::{rgb_to_u32, yuyv_to_rgb};
pub use error::ImageError;
pub use frame::Frame;

/// Decodes a compressed image (MJPEG camera payloads, PNG) into an RGB frame.
///
/// The format is auto-detected by the `image` crate; grey and alpha variants are
/// converted to RGB.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the data is invalid or the format is unsupported.
pub fn decode_frame(data: &[u8]) -> Result<Frame, ImageError> {
    let rgb = crates_image::load_from_memory(data)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Frame::from_rgb(width as usize, height as usize, rgb.into_raw())
}
