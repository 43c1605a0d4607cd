use camera_pose::{ConfigError, SessionConfig};
use deli_infer::{BodyPart, Device, ModelSource};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn from_vars(vars: &[(&str, &str)]) -> Result<SessionConfig, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    SessionConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = from_vars(&[]).unwrap();

    assert_eq!(config.camera().device(), "/dev/video0");
    assert_eq!((config.camera().width(), config.camera().height()), (640, 480));
    match config.capability().model() {
        ModelSource::File(path) => assert_eq!(path, &PathBuf::from("models/yolov8n-pose.onnx")),
        other => panic!("Expected a model file, got {:?}", other),
    }
    assert_eq!(
        config.backends(),
        &[
            Device::TensorRt {
                device_id: 0,
                fp16: false,
            },
            Device::Cuda { device_id: 0 },
            Device::Cpu,
        ]
    );
    assert_eq!(config.render().min_confidence(), 0.5);
    assert_eq!(config.render().shoulder_confidence(), 0.5);
    assert_eq!(config.render().keypoint_radius(), 5.0);
    assert_eq!(config.render().skeleton_width(), 2);
    assert_eq!(config.render().shoulder_width(), 4);
    assert_eq!(config.render().color(), [255, 0, 0]);
    assert_eq!(config.render().connections().len(), 12);
    assert!(!config.mirror());
    assert_eq!(config.refresh_hz(), 30);
    assert!(config.log_dir().is_none());
}

#[test]
fn test_overrides() {
    let config = from_vars(&[
        ("DELI_MODEL_PATH", "/opt/models/pose.onnx"),
        ("DELI_CAMERA_DEVICE", "/dev/video2"),
        ("DELI_BACKENDS", "tensorrt,cuda:1,cpu"),
        ("DELI_MIN_CONFIDENCE", "0.3"),
        ("DELI_SHOULDER_CONFIDENCE", "0.7"),
        ("DELI_MIRROR", "true"),
        ("DELI_REFRESH_HZ", "60"),
        ("DELI_LOG_DIR", "/tmp/deli-logs"),
    ])
    .unwrap();

    assert_eq!(config.camera().device(), "/dev/video2");
    assert_eq!(config.backends().len(), 3);
    assert_eq!(config.backends()[1], Device::Cuda { device_id: 1 });
    assert_eq!(config.render().min_confidence(), 0.3);
    assert_eq!(config.render().shoulder_confidence(), 0.7);
    assert!(config.mirror());
    assert_eq!(config.refresh_hz(), 60);
    assert_eq!(config.refresh_interval(), Duration::from_secs(1) / 60);
    assert_eq!(config.log_dir(), Some(&PathBuf::from("/tmp/deli-logs")));
}

#[test]
fn test_invalid_values_name_the_variable() {
    let cases = [
        ("DELI_MIN_CONFIDENCE", "high"),
        ("DELI_SHOULDER_CONFIDENCE", "1.5"),
        ("DELI_MIRROR", "sometimes"),
        ("DELI_REFRESH_HZ", "0"),
        ("DELI_BACKENDS", "cuda,abacus"),
    ];

    for (var, value) in cases {
        match from_vars(&[(var, value)]) {
            Err(ConfigError::Invalid { var: got, .. }) => assert_eq!(got, var),
            other => panic!("Expected Invalid for {}={}, got {:?}", var, value, other.map(|_| ())),
        }
    }
}

#[test]
fn test_mirror_flag_spellings() {
    assert!(from_vars(&[("DELI_MIRROR", "1")]).unwrap().mirror());
    assert!(!from_vars(&[("DELI_MIRROR", "0")]).unwrap().mirror());
    assert!(!from_vars(&[("DELI_MIRROR", "False")]).unwrap().mirror());
}

#[test]
fn test_skeleton_file() {
    let path = std::env::temp_dir().join(format!("deli-skeleton-{}.json", std::process::id()));
    std::fs::write(&path, r#"[["nose", "leftEye"], ["nose", "rightEye"]]"#).unwrap();

    let config = from_vars(&[("DELI_SKELETON_PATH", path.to_str().unwrap())]).unwrap();
    let table = config.render().connections();
    assert_eq!(table.len(), 2);
    assert!(table.contains(BodyPart::Nose, BodyPart::LeftEye));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_skeleton_file_with_unknown_label_fails() {
    let path = std::env::temp_dir().join(format!("deli-skeleton-bad-{}.json", std::process::id()));
    std::fs::write(&path, r#"[["nose", "snout"]]"#).unwrap();

    let result = from_vars(&[("DELI_SKELETON_PATH", path.to_str().unwrap())]);
    assert!(matches!(result, Err(ConfigError::Skeleton(_))));

    std::fs::remove_file(&path).ok();
}
