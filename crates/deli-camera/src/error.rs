use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CameraError {
    /// Access to the device was refused by the OS or user.
    PermissionDenied(String),
    /// No camera at the requested path.
    DeviceUnavailable(String),
    Device(String),
    Stream(String),
    Decode(deli_image::ImageError),
    /// The capture stream has ended and no more frames will arrive.
    Channel(String),
}

impl CameraError {
    /// Failures that end the session: acquisition errors and a dead stream.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CameraError::PermissionDenied(_)
                | CameraError::DeviceUnavailable(_)
                | CameraError::Channel(_)
        )
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied(msg) => write!(f, "camera permission denied: {msg}"),
            CameraError::DeviceUnavailable(msg) => write!(f, "camera unavailable: {msg}"),
            CameraError::Device(msg) => write!(f, "device error: {msg}"),
            CameraError::Stream(msg) => write!(f, "stream error: {msg}"),
            CameraError::Decode(err) => write!(f, "decode error: {err}"),
            CameraError::Channel(msg) => write!(f, "channel error: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<io::Error> for CameraError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => CameraError::PermissionDenied(err.to_string()),
            io::ErrorKind::NotFound => CameraError::DeviceUnavailable(err.to_string()),
            _ => match err.raw_os_error() {
                // ENXIO, ENODEV: node exists but nothing behind it
                Some(6) | Some(19) => CameraError::DeviceUnavailable(err.to_string()),
                _ => CameraError::Device(err.to_string()),
            },
        }
    }
}

impl From<deli_image::ImageError> for CameraError {
    fn from(err: deli_image::ImageError) -> Self {
        CameraError::Decode(err)
    }
}
