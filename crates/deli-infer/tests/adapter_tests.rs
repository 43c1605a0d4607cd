mod common;

use common::{Candidate, MockBackend, MockSession, model_output};
use deli_base::Vec2;
use deli_image::Frame;
use deli_infer::{
    BodyPart, CapabilityConfig, Device, EstimateOptions, InferError, OnnxPoseAdapter,
    PoseEstimator, YoloPoseEstimator,
};
use futures_util::FutureExt;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn frame_640x480() -> Frame {
    Frame::from_rgb(640, 480, vec![0; 640 * 480 * 3]).unwrap()
}

fn adapter_with(candidates: &[Candidate]) -> OnnxPoseAdapter {
    adapter_from(MockSession::new(model_output(candidates)))
}

#[tokio::test]
async fn test_estimate_returns_pose() {
    let mut adapter = adapter_with(&[Candidate::new(0.9).with(BodyPart::Nose, 10.0, 90.0, 0.8)]);

    let pose = adapter
        .estimate(frame_640x480(), EstimateOptions::default())
        .await
        .unwrap();

    assert_eq!(pose.keypoint(BodyPart::Nose).position, Vec2::new(10.0, 10.0));
    assert!(!adapter.is_busy());
}

#[tokio::test]
async fn test_estimate_mirrors_horizontally() {
    let mut adapter = adapter_with(&[Candidate::new(0.9).with(BodyPart::Nose, 10.0, 90.0, 0.8)]);
    let options = EstimateOptions {
        mirror_horizontally: true,
    };

    let pose = adapter.estimate(frame_640x480(), options).await.unwrap();

    assert_eq!(pose.keypoint(BodyPart::Nose).position, Vec2::new(629.0, 10.0));
    assert_eq!(pose.keypoint(BodyPart::Nose).part, BodyPart::Nose);
}

fn adapter_from(session: MockSession) -> OnnxPoseAdapter {
    OnnxPoseAdapter::from_estimator(YoloPoseEstimator::from_session(Box::new(session)), Device::Cpu)
}

async fn wait_until_idle(adapter: &OnnxPoseAdapter) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while adapter.is_busy() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("estimator never returned to the adapter");
}

#[tokio::test]
async fn test_second_call_while_in_flight_is_busy() {
    let (session, release) = MockSession::gated(model_output(&[]));
    let mut adapter = adapter_from(session);

    let first = adapter.estimate(frame_640x480(), EstimateOptions::default());
    assert!(adapter.is_busy());

    let second = adapter.estimate(frame_640x480(), EstimateOptions::default()).await;
    assert!(matches!(second, Err(InferError::Busy)));

    drop(release);
    first.await.unwrap();
    assert!(!adapter.is_busy());
    assert!(adapter.estimate(frame_640x480(), EstimateOptions::default()).await.is_ok());
}

#[tokio::test]
async fn test_dropped_estimate_returns_estimator() {
    let (session, release) = MockSession::gated(model_output(&[]));
    let calls = session.calls.clone();
    let mut adapter = adapter_from(session);

    drop(adapter.estimate(frame_640x480(), EstimateOptions::default()));
    assert!(adapter.is_busy());

    drop(release);
    wait_until_idle(&adapter).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(adapter.estimate(frame_640x480(), EstimateOptions::default()).await.is_ok());
}

#[tokio::test]
async fn test_panicking_estimate_returns_estimator() {
    let mut session = MockSession::new(model_output(&[]));
    session.panic_once = true;
    let mut adapter = adapter_from(session);

    let result = adapter.estimate(frame_640x480(), EstimateOptions::default()).await;
    assert!(matches!(result, Err(InferError::Runtime(_))));
    assert!(!adapter.is_busy());

    assert!(adapter.estimate(frame_640x480(), EstimateOptions::default()).await.is_ok());
}

#[test]
fn test_estimate_outside_runtime_fails() {
    let mut adapter = adapter_with(&[]);

    let result = adapter
        .estimate(frame_640x480(), EstimateOptions::default())
        .now_or_never();

    assert!(matches!(result, Some(Err(InferError::Runtime(_)))));
    assert!(!adapter.is_busy());
}

#[tokio::test]
async fn test_initialize_with_falls_back_to_cpu() {
    let backend = MockBackend::new(model_output(&[]));
    let config = CapabilityConfig::default().with_backends(vec![
        Device::TensorRt {
            device_id: 0,
            fp16: false,
        },
        Device::Cuda { device_id: 0 },
    ]);

    let adapter = OnnxPoseAdapter::initialize_with(backend, config).await.unwrap();
    assert_eq!(adapter.device(), &Device::Cpu);
}

#[tokio::test]
async fn test_initialize_with_picks_first_available() {
    let mut backend = MockBackend::new(model_output(&[]));
    backend.available = vec![Device::Cpu, Device::Cuda { device_id: 1 }];
    let config = CapabilityConfig::default()
        .with_backends(vec![Device::Cuda { device_id: 0 }, Device::Cuda { device_id: 1 }, Device::Cpu]);

    let adapter = OnnxPoseAdapter::initialize_with(backend, config).await.unwrap();
    assert_eq!(adapter.device(), &Device::Cuda { device_id: 1 });
}

#[tokio::test]
async fn test_initialize_with_reports_model_load() {
    let mut backend = MockBackend::new(model_output(&[]));
    backend.fail_load = true;

    let result = OnnxPoseAdapter::initialize_with(backend, CapabilityConfig::default()).await;
    assert!(matches!(result, Err(InferError::ModelLoad(_))));
}
