use crate::InferError;
use std::fmt;
use std::str::FromStr;

/// Compute target for a model session.
#[derive(Debug, Clone, PartialEq)]
pub enum Device {
    Cpu,
    Cuda { device_id: i32 },
    TensorRt { device_id: i32, fp16: bool },
}

impl Device {
    /// Short identifier as accepted by `FromStr` (`cpu`, `cuda:1`, `tensorrt`).
    pub fn identifier(&self) -> String {
        match self {
            Device::Cpu => "cpu".to_string(),
            Device::Cuda { device_id: 0 } => "cuda".to_string(),
            Device::Cuda { device_id } => format!("cuda:{device_id}"),
            Device::TensorRt { device_id: 0, .. } => "tensorrt".to_string(),
            Device::TensorRt { device_id, .. } => format!("tensorrt:{device_id}"),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Cuda { device_id } => write!(f, "CUDA(device_id={device_id})"),
            Device::TensorRt { device_id, fp16 } => {
                write!(f, "TensorRT(device_id={device_id}, fp16={fp16})")
            }
        }
    }
}

impl FromStr for Device {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (kind, id) = match s.split_once(':') {
            Some((kind, id)) => {
                let id = id
                    .parse::<i32>()
                    .ok()
                    .filter(|id| *id >= 0)
                    .ok_or_else(|| InferError::UnknownDevice(s.clone()))?;
                (kind, id)
            }
            None => (s.as_str(), 0),
        };

        match kind {
            "cpu" if id == 0 => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda { device_id: id }),
            "tensorrt" | "trt" => Ok(Device::TensorRt {
                device_id: id,
                fp16: false,
            }),
            _ => Err(InferError::UnknownDevice(s.clone())),
        }
    }
}

/// Parse a comma-separated preference list such as `"tensorrt,cuda,cpu"`.
///
/// Empty entries are skipped; any unknown identifier fails the whole list.
pub fn parse_device_list(list: &str) -> Result<Vec<Device>, InferError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
