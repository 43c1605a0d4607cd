use crate::render::RenderConfig;
use deli_camera::CameraConfig;
use deli_infer::{CapabilityConfig, ConnectionTable, Device, InferError, ModelSource, parse_device_list};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const MODEL_PATH_VAR: &str = "DELI_MODEL_PATH";
pub const CAMERA_DEVICE_VAR: &str = "DELI_CAMERA_DEVICE";
pub const BACKENDS_VAR: &str = "DELI_BACKENDS";
pub const MIN_CONFIDENCE_VAR: &str = "DELI_MIN_CONFIDENCE";
pub const SHOULDER_CONFIDENCE_VAR: &str = "DELI_SHOULDER_CONFIDENCE";
pub const MIRROR_VAR: &str = "DELI_MIRROR";
pub const REFRESH_HZ_VAR: &str = "DELI_REFRESH_HZ";
pub const SKELETON_PATH_VAR: &str = "DELI_SKELETON_PATH";
pub const LOG_DIR_VAR: &str = "DELI_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    Skeleton(InferError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { var, value, reason } => {
                write!(f, "invalid {var}={value:?}: {reason}")
            }
            ConfigError::Skeleton(err) => write!(f, "cannot load {SKELETON_PATH_VAR}: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything a pose session needs to start.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    camera: CameraConfig,
    capability: CapabilityConfig,
    render: RenderConfig,
    mirror: bool,
    refresh_hz: u32,
    log_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            capability: CapabilityConfig::default(),
            render: RenderConfig::default(),
            mirror: false,
            refresh_hz: 30,
            log_dir: None,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `DELI_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(MODEL_PATH_VAR) {
            config.capability = config.capability.with_model(ModelSource::File(path.into()));
        }
        if let Some(device) = lookup(CAMERA_DEVICE_VAR) {
            config.camera = config.camera.with_device(device);
        }
        if let Some(list) = lookup(BACKENDS_VAR) {
            let backends = parse_device_list(&list).map_err(|e| invalid(BACKENDS_VAR, &list, e))?;
            config.capability = config.capability.with_backends(backends);
        }
        if let Some(value) = lookup(MIN_CONFIDENCE_VAR) {
            let threshold = parse_confidence(MIN_CONFIDENCE_VAR, &value)?;
            config.render = config.render.with_min_confidence(threshold);
        }
        if let Some(value) = lookup(SHOULDER_CONFIDENCE_VAR) {
            let threshold = parse_confidence(SHOULDER_CONFIDENCE_VAR, &value)?;
            config.render = config.render.with_shoulder_confidence(threshold);
        }
        if let Some(value) = lookup(MIRROR_VAR) {
            config.mirror = parse_flag(MIRROR_VAR, &value)?;
        }
        if let Some(value) = lookup(REFRESH_HZ_VAR) {
            config.refresh_hz = match value.trim().parse::<u32>() {
                Ok(hz) if (1..=240).contains(&hz) => hz,
                _ => return Err(invalid(REFRESH_HZ_VAR, &value, "expected 1..=240")),
            };
        }
        if let Some(path) = lookup(SKELETON_PATH_VAR) {
            let table = ConnectionTable::load(&path).map_err(ConfigError::Skeleton)?;
            config.render = config.render.with_connections(table);
        }
        if let Some(dir) = lookup(LOG_DIR_VAR).filter(|d| !d.is_empty()) {
            config.log_dir = Some(dir.into());
        }

        Ok(config)
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_capability(mut self, capability: CapabilityConfig) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_refresh_hz(mut self, hz: u32) -> Self {
        self.refresh_hz = hz.max(1);
        self
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    pub fn capability(&self) -> &CapabilityConfig {
        &self.capability
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn mirror(&self) -> bool {
        self.mirror
    }

    pub fn refresh_hz(&self) -> u32 {
        self.refresh_hz
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_hz.max(1)
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.log_dir.as_ref()
    }

    pub fn backends(&self) -> &[Device] {
        self.capability.backends()
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_confidence(var: &'static str, value: &str) -> Result<f32, ConfigError> {
    match value.trim().parse::<f32>() {
        Ok(v) if (0.0..=1.0).contains(&v) => Ok(v),
        _ => Err(invalid(var, value, "expected a number in [0, 1]")),
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, value, "expected 1/0/true/false")),
    }
}
