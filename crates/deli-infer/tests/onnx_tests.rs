#![cfg(feature = "onnx")]

use deli_base::Tensor;
use deli_infer::backends::onnx::{ndarray_to_tensor, tensor_view};
use deli_infer::{Backend, Device, InferError, ModelSource, OnnxBackend};

#[test]
fn test_onnx_backend_name() {
    assert_eq!(OnnxBackend::new().name(), "onnx");
}

#[test]
fn test_cpu_always_probes() {
    assert!(OnnxBackend::new().probe(&Device::Cpu).is_ok());
}

#[test]
fn test_load_missing_model_is_model_load_error() {
    let result = OnnxBackend::new().load_model(
        ModelSource::File("nonexistent.onnx".into()),
        &Device::Cpu,
    );
    assert!(matches!(result, Err(InferError::ModelLoad(_))));
}

#[test]
fn test_tensor_view_conversion() {
    let tensor = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let array = tensor_view(&tensor).unwrap();

    assert_eq!(array.shape(), &[2, 3]);
    assert_eq!(array[[0, 0]], 1.0);
    assert_eq!(array[[1, 2]], 6.0);

    let back = ndarray_to_tensor(array).unwrap();
    assert_eq!(back, tensor);
}
