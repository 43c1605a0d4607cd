use crate::CameraError;
use deli_image::Frame;

/// Live camera stream.
#[allow(async_fn_in_trait)]
pub trait Camera {
    /// Begin streaming. Fails if the device cannot deliver frames.
    ///
    /// `recv` and `current` start the stream on first use when this was not
    /// called; calling it again after success does nothing.
    fn start(&mut self) -> Result<(), CameraError>;

    /// Receive the next frame from the camera, waiting until one arrives.
    async fn recv(&mut self) -> Result<Frame, CameraError>;

    /// The most recent frame, without waiting.
    ///
    /// Returns `Frame::empty()` (0×0) until the stream has produced data.
    fn current(&mut self) -> Result<Frame, CameraError>;
}
