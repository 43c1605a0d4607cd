use deli_camera::CameraError;
use deli_image::ImageError;
use std::io;

#[test]
fn test_from_io_error_not_found() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "device not found");
    let cam_err: CameraError = io_err.into();

    match cam_err {
        CameraError::DeviceUnavailable(msg) => assert!(msg.contains("device not found")),
        other => panic!("Expected CameraError::DeviceUnavailable, got {:?}", other),
    }
}

#[test]
fn test_from_io_error_permission_denied() {
    let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access refused");
    let cam_err: CameraError = io_err.into();

    assert!(matches!(cam_err, CameraError::PermissionDenied(_)));
    assert!(cam_err.is_fatal());
}

#[test]
fn test_from_io_error_no_device() {
    // ENODEV
    let cam_err: CameraError = io::Error::from_raw_os_error(19).into();
    assert!(matches!(cam_err, CameraError::DeviceUnavailable(_)));
}

#[test]
fn test_from_io_error_other() {
    let io_err = io::Error::new(io::ErrorKind::Other, "ioctl failed");
    let cam_err: CameraError = io_err.into();

    match cam_err {
        CameraError::Device(msg) => assert!(msg.contains("ioctl failed")),
        other => panic!("Expected CameraError::Device, got {:?}", other),
    }
}

#[test]
fn test_from_image_error() {
    let img_err = ImageError::Decode("invalid JPEG".to_string());
    let cam_err: CameraError = img_err.into();

    match cam_err {
        CameraError::Decode(_) => {}
        _ => panic!("Expected CameraError::Decode variant"),
    }
}

#[test]
fn test_is_fatal() {
    assert!(CameraError::PermissionDenied("x".into()).is_fatal());
    assert!(CameraError::DeviceUnavailable("x".into()).is_fatal());
    assert!(!CameraError::Device("x".into()).is_fatal());
    assert!(!CameraError::Stream("x".into()).is_fatal());
    assert!(CameraError::Channel("x".into()).is_fatal());
    assert!(!CameraError::Decode(ImageError::Decode("x".into())).is_fatal());
}

#[test]
fn test_error_display() {
    let device_err = CameraError::Device("V4L2 error".to_string());
    assert!(device_err.to_string().contains("V4L2 error"));

    let stream_err = CameraError::Stream("streaming failed".to_string());
    assert!(stream_err.to_string().contains("streaming failed"));

    let denied = CameraError::PermissionDenied("/dev/video0".to_string());
    assert!(denied.to_string().contains("permission denied"));
}
