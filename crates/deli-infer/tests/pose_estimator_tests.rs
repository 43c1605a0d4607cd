mod common;

use common::{Candidate, MockBackend, MockSession, model_output};
use deli_base::Vec2;
use deli_image::Frame;
use deli_infer::{BodyPart, Device, InferError, ModelSource, Pose, YoloPoseEstimator};
use std::sync::atomic::Ordering;

fn frame_640x480() -> Frame {
    Frame::from_rgb(640, 480, vec![128; 640 * 480 * 3]).unwrap()
}

#[test]
fn test_estimate_maps_letterboxed_output() {
    let output = model_output(&[Candidate::new(0.9).with(BodyPart::LeftShoulder, 100.0, 130.0, 0.9)]);
    let session = MockSession::new(output);
    let calls = session.calls.clone();
    let mut estimator = YoloPoseEstimator::from_session(Box::new(session));

    let pose = estimator.estimate(&frame_640x480()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(pose.keypoint(BodyPart::LeftShoulder).position, Vec2::new(100.0, 50.0));
}

#[test]
fn test_estimate_threshold_filters_candidates() {
    let output = model_output(&[Candidate::new(0.3)]);
    let mut estimator =
        YoloPoseEstimator::from_session(Box::new(MockSession::new(output))).with_conf_threshold(0.5);

    assert_eq!(estimator.conf_threshold(), 0.5);
    assert_eq!(estimator.estimate(&frame_640x480()).unwrap(), Pose::empty());
}

#[test]
fn test_estimate_does_not_run_on_empty_frame() {
    let session = MockSession::new(model_output(&[]));
    let calls = session.calls.clone();
    let mut estimator = YoloPoseEstimator::from_session(Box::new(session));

    assert!(matches!(estimator.estimate(&Frame::empty()), Err(InferError::Shape(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_new_propagates_load_failure() {
    let mut backend = MockBackend::new(model_output(&[]));
    backend.fail_load = true;

    let result = YoloPoseEstimator::new(
        ModelSource::File("missing.onnx".into()),
        &backend,
        &Device::Cpu,
    );
    assert!(result.is_err());
}
