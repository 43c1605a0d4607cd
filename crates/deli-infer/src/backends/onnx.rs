use crate::{Backend, Device, InferError, ModelSource, Session};
use deli_base::Tensor;
use ndarray::{ArrayViewD, IxDyn};
use ort::{inputs, session::Session as OrtSession, session::builder::SessionBuilder, value::TensorRef};
use std::collections::HashMap;

/// ONNX Runtime backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxBackend;

impl OnnxBackend {
    pub fn new() -> Self {
        Self
    }

    fn builder_for(device: &Device) -> Result<SessionBuilder, InferError> {
        let builder = OrtSession::builder().map_err(|e| {
            InferError::Runtime(format!("failed to create session builder: {}", e))
        })?;

        match device {
            Device::Cpu => Ok(builder),
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::execution_providers::CUDAExecutionProvider;
                let ep = CUDAExecutionProvider::default().with_device_id(*device_id);
                builder
                    .with_execution_providers([ep.build().error_on_failure()])
                    .map_err(|e| InferError::ModelLoad(format!("{device}: {e}")))
            }
            #[cfg(feature = "tensorrt")]
            Device::TensorRt { device_id, fp16 } => {
                use ort::execution_providers::TensorRTExecutionProvider;
                let ep = TensorRTExecutionProvider::default()
                    .with_device_id(*device_id)
                    .with_fp16(*fp16);
                builder
                    .with_execution_providers([ep.build().error_on_failure()])
                    .map_err(|e| InferError::ModelLoad(format!("{device}: {e}")))
            }
            #[allow(unreachable_patterns)]
            other => Err(InferError::BackendUnavailable {
                device: other.clone(),
                reason: "support not compiled in".to_string(),
            }),
        }
    }
}

impl Backend for OnnxBackend {
    fn name(&self) -> &str {
        "onnx"
    }

    fn probe(&self, device: &Device) -> Result<(), InferError> {
        let available = match device {
            Device::Cpu => Ok(true),
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
                CUDAExecutionProvider::default()
                    .with_device_id(*device_id)
                    .is_available()
            }
            #[cfg(feature = "tensorrt")]
            Device::TensorRt { device_id, .. } => {
                use ort::execution_providers::{ExecutionProvider, TensorRTExecutionProvider};
                TensorRTExecutionProvider::default()
                    .with_device_id(*device_id)
                    .is_available()
            }
            #[allow(unreachable_patterns)]
            _ => Ok(false),
        };

        match available {
            Ok(true) => Ok(()),
            Ok(false) => Err(InferError::BackendUnavailable {
                device: device.clone(),
                reason: "execution provider not available".to_string(),
            }),
            Err(e) => Err(InferError::BackendUnavailable {
                device: device.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn load_model(
        &self,
        model: ModelSource,
        device: &Device,
    ) -> Result<Box<dyn Session>, InferError> {
        let builder = Self::builder_for(device)?;

        let session = match &model {
            ModelSource::File(path) => builder.commit_from_file(path),
            ModelSource::Memory(bytes) => builder.commit_from_memory(bytes),
        }
        .map_err(|e| InferError::ModelLoad(format!("failed to load model from {}: {}", model, e)))?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        log::debug!(
            "onnx session on {}: inputs {:?}, outputs {:?}",
            device,
            input_names,
            output_names
        );

        Ok(Box::new(OnnxSession {
            session,
            input_names,
            output_names,
        }))
    }
}

pub struct OnnxSession {
    session: OrtSession,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl Session for OnnxSession {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError> {
        // pose models take a single image input
        let [(name, tensor)] = inputs else {
            return Err(InferError::Runtime(format!(
                "expected 1 input, got {}",
                inputs.len()
            )));
        };
        if !self.input_names.iter().any(|n| n.as_str() == *name) {
            return Err(InferError::Runtime(format!(
                "unknown input '{}', model expects {:?}",
                name, self.input_names
            )));
        }

        let array = tensor_view(tensor)?;
        let tensor_ref = TensorRef::from_array_view(array)
            .map_err(|e| InferError::Runtime(format!("failed to create tensor ref: {}", e)))?;
        let outputs = self
            .session
            .run(inputs![*name => tensor_ref])
            .map_err(|e| InferError::Runtime(format!("inference failed: {}", e)))?;

        let mut result = HashMap::new();
        for output_name in &self.output_names {
            let array = outputs[output_name.as_str()]
                .try_extract_array::<f32>()
                .map_err(|e| {
                    InferError::Runtime(format!("output '{}' is not f32: {}", output_name, e))
                })?;
            result.insert(output_name.clone(), ndarray_to_tensor(array)?);
        }

        Ok(result)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

/// Borrow a `Tensor<f32>` as an ndarray view.
pub fn tensor_view(tensor: &Tensor<f32>) -> Result<ArrayViewD<'_, f32>, InferError> {
    ArrayViewD::from_shape(IxDyn(&tensor.shape), &tensor.data)
        .map_err(|e| InferError::Shape(format!("tensor does not fit its shape: {}", e)))
}

/// Copy an ndarray view into a `Tensor<f32>`.
pub fn ndarray_to_tensor(array: ArrayViewD<'_, f32>) -> Result<Tensor<f32>, InferError> {
    let shape = array.shape().to_vec();
    let data = array.iter().copied().collect();
    Ok(Tensor::new(shape, data)?)
}
