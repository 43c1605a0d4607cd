use crate::{Camera, CameraConfig, CameraError, PixelFormat};
use deli_image::Frame;
use std::sync::mpsc::{RecvTimeoutError, SyncSender, sync_channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

type FrameResult = Result<Frame, CameraError>;

const MJPG: &[u8; 4] = b"MJPG";
const YUYV: &[u8; 4] = b"YUYV";

/// How long `start` waits for the first frame.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// V4L2 camera implementation.
///
/// The device is opened exclusively in `new` and released when the camera is
/// dropped. Capture runs on a background thread started by `start`, or on
/// first use.
pub struct V4l2Camera {
    config: CameraConfig,
    device: Option<Device>,
    format: Format,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
    latest: Frame,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("device", &"<v4l::Device>")
            .field("format", &self.format.fourcc.str().unwrap_or("????"))
            .field("receiver", &self.receiver.is_some())
            .field("thread_handle", &self.thread_handle.is_some())
            .finish()
    }
}

impl Camera for V4l2Camera {
    /// Map the capture buffers and wait for the first frame.
    ///
    /// Buffer allocation errors (e.g. `EBUSY` from another process holding the
    /// stream) and a device that never delivers are reported here.
    fn start(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Device("Device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count() as usize;
        let (tx, rx) = mpsc::channel(buffer_count);
        let (ready_tx, ready_rx) = sync_channel(1);
        let format = self.format.clone();

        let handle = thread::spawn(move || {
            Self::capture_loop(device, format, tx, buffer_count, ready_tx);
        });

        match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(RecvTimeoutError::Timeout) => {
                // the thread exits on its next frame once the receiver is gone
                drop(rx);
                return Err(CameraError::Stream(format!(
                    "no frame from {} within {:?}",
                    self.config.device(),
                    STARTUP_TIMEOUT
                )));
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                return Err(CameraError::Stream(
                    "capture thread exited during startup".to_string(),
                ));
            }
        }

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);
        log::debug!("streaming from {}", self.config.device());

        Ok(())
    }

    async fn recv(&mut self) -> Result<Frame, CameraError> {
        self.start()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("Receiver not initialized".to_string()))?;

        let frame = receiver
            .recv()
            .await
            .ok_or_else(|| CameraError::Channel("Channel closed".to_string()))??;
        self.latest = frame.clone();
        Ok(frame)
    }

    fn current(&mut self) -> Result<Frame, CameraError> {
        self.start()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("Receiver not initialized".to_string()))?;

        // drain everything queued, only the newest item matters
        let mut last = None;
        loop {
            match receiver.try_recv() {
                Ok(item) => last = Some(item),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if last.is_none() {
                        return Err(CameraError::Channel("Channel closed".to_string()));
                    }
                    break;
                }
            }
        }

        match last {
            Some(Ok(frame)) => {
                self.latest = frame;
                Ok(self.latest.clone())
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.latest.clone()),
        }
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // closing the receiver makes the capture thread exit on its next frame
        drop(self.receiver.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        log::debug!("released camera {}", self.config.device());
    }
}

impl V4l2Camera {
    /// Open the device at `config.device()` and negotiate a capture format.
    ///
    /// MJPEG is requested first unless the config asks for YUYV; if the device
    /// answers with something else, the other format is tried.
    ///
    /// # Errors
    ///
    /// - `CameraError::PermissionDenied` if the OS refuses access
    /// - `CameraError::DeviceUnavailable` if no camera exists at the path
    /// - `CameraError::Device` if neither MJPEG nor YUYV is supported, or
    ///   format/parameter setting fails
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        config.validate()?;

        let device = Device::with_path(config.device())?;

        let order: [&[u8; 4]; 2] = match config.format() {
            PixelFormat::Mjpeg => [MJPG, YUYV],
            PixelFormat::Yuyv => [YUYV, MJPG],
        };

        let mut accepted = None;
        for fourcc in order {
            let request = Format::new(config.width(), config.height(), FourCC::new(fourcc));
            let format = Capture::set_format(&device, &request)?;
            if format.fourcc == FourCC::new(fourcc) {
                accepted = Some(format);
                break;
            }
            log::debug!(
                "{} rejected {}, trying next format",
                config.device(),
                String::from_utf8_lossy(fourcc)
            );
        }
        let format = accepted.ok_or_else(|| {
            CameraError::Device("neither MJPEG nor YUYV is supported by device".to_string())
        })?;

        let params = v4l::video::capture::Parameters::with_fps(config.fps());
        Capture::set_params(&device, &params)?;

        log::info!(
            "opened {} at {}x{} {}",
            config.device(),
            format.width,
            format.height,
            format.fourcc.str().unwrap_or("????")
        );

        Ok(Self {
            config,
            device: Some(device),
            format,
            receiver: None,
            thread_handle: None,
            latest: Frame::empty(),
        })
    }

    /// Background thread capture loop.
    ///
    /// Reports on `ready` once the first frame is dequeued, or with the error
    /// that prevented it. Later errors are sent down the frame channel before
    /// the thread exits. Frames are dropped rather than queued when the
    /// consumer falls behind.
    fn capture_loop(
        device: Device,
        format: Format,
        tx: mpsc::Sender<FrameResult>,
        buffer_count: usize,
        ready: SyncSender<Result<(), CameraError>>,
    ) {
        let mut stream =
            match MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count as u32) {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready.send(Err(CameraError::from(e)));
                    return;
                }
            };
        let mut ready = Some(ready);

        loop {
            let data = match CaptureStream::next(&mut stream) {
                Ok((data, _metadata)) => data,
                Err(e) => {
                    let err = CameraError::from(e);
                    match ready.take() {
                        Some(ready) => {
                            let _ = ready.send(Err(err));
                        }
                        None => {
                            log::error!("capture thread error: {}", err);
                            let _ = tx.blocking_send(Err(err));
                        }
                    }
                    return;
                }
            };
            if let Some(ready) = ready.take() {
                let _ = ready.send(Ok(()));
            }

            if tx.is_closed() {
                break;
            }
            if tx.capacity() == 0 {
                continue;
            }

            let frame = Self::decode(&format, data).map_err(CameraError::from);

            match tx.try_send(frame) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Closed(_)) => break,
            }
        }
    }

    fn decode(format: &Format, data: &[u8]) -> Result<Frame, deli_image::ImageError> {
        if format.fourcc == FourCC::new(YUYV) {
            let width = format.width as usize;
            let height = format.height as usize;
            let rgb = deli_image::yuyv_to_rgb(data, width, height)?;
            Frame::from_rgb(width, height, rgb)
        } else {
            deli_image::decode_frame(data)
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Resolution the device actually settled on.
    pub fn resolution(&self) -> (u32, u32) {
        (self.format.width, self.format.height)
    }
}
