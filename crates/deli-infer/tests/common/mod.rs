#![allow(dead_code)]

use deli_base::Tensor;
use deli_infer::pose::OUTPUT_ROWS;
use deli_infer::{Backend, BodyPart, Device, InferError, ModelSource, Session};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

/// One candidate row set: score plus (x, y, visibility) per body part.
pub struct Candidate {
    pub score: f32,
    pub keypoints: [(f32, f32, f32); 17],
}

impl Candidate {
    pub fn new(score: f32) -> Self {
        Self {
            score,
            keypoints: [(0.0, 0.0, 0.0); 17],
        }
    }

    pub fn with(mut self, part: BodyPart, x: f32, y: f32, vis: f32) -> Self {
        self.keypoints[part.index()] = (x, y, vis);
        self
    }
}

/// Build a `[1, 56, N]` model output from candidates.
pub fn model_output(candidates: &[Candidate]) -> Tensor<f32> {
    let n = candidates.len();
    let mut data = vec![0.0; OUTPUT_ROWS * n];
    for (i, c) in candidates.iter().enumerate() {
        data[2 * n + i] = 10.0;
        data[3 * n + i] = 10.0;
        data[4 * n + i] = c.score;
        for (k, &(x, y, vis)) in c.keypoints.iter().enumerate() {
            let base = 5 + k * 3;
            data[base * n + i] = x;
            data[(base + 1) * n + i] = y;
            data[(base + 2) * n + i] = vis;
        }
    }
    Tensor::new(vec![1, OUTPUT_ROWS, n], data).unwrap()
}

/// Session returning a fixed output and counting calls.
pub struct MockSession {
    pub output: Tensor<f32>,
    pub calls: Arc<AtomicUsize>,
    /// Panic inside the first `run`.
    pub panic_once: bool,
    gate: Option<mpsc::Receiver<()>>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl MockSession {
    pub fn new(output: Tensor<f32>) -> Self {
        Self {
            output,
            calls: Arc::new(AtomicUsize::new(0)),
            panic_once: false,
            gate: None,
            inputs: vec!["images".to_string()],
            outputs: vec!["output0".to_string()],
        }
    }

    /// A session whose `run` blocks until the returned sender sends or is dropped.
    pub fn gated(output: Tensor<f32>) -> (Self, mpsc::Sender<()>) {
        let (release, gate) = mpsc::channel();
        let mut session = Self::new(output);
        session.gate = Some(gate);
        (session, release)
    }
}

impl Session for MockSession {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        if self.panic_once && call == 0 {
            panic!("session crashed");
        }
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].0, "images");
        assert_eq!(inputs[0].1.shape, vec![1, 3, 640, 640]);

        let mut result = HashMap::new();
        result.insert("output0".to_string(), self.output.clone());
        Ok(result)
    }

    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }
}

/// Backend that accepts only the listed devices.
pub struct MockBackend {
    pub available: Vec<Device>,
    pub fail_load: bool,
    pub output: Tensor<f32>,
}

impl MockBackend {
    pub fn new(output: Tensor<f32>) -> Self {
        Self {
            available: vec![Device::Cpu],
            fail_load: false,
            output,
        }
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn probe(&self, device: &Device) -> Result<(), InferError> {
        if self.available.contains(device) {
            Ok(())
        } else {
            Err(InferError::BackendUnavailable {
                device: device.clone(),
                reason: "not in mock".to_string(),
            })
        }
    }

    fn load_model(
        &self,
        _model: ModelSource,
        _device: &Device,
    ) -> Result<Box<dyn Session>, InferError> {
        if self.fail_load {
            return Err(InferError::Io("model file missing".to_string()));
        }
        Ok(Box::new(MockSession::new(self.output.clone())))
    }
}
