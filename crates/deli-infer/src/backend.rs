use crate::{Device, InferError, ModelSource, Session};

/// A model runtime that can load sessions onto devices.
pub trait Backend: Send {
    fn name(&self) -> &str;

    /// Check whether `device` can be used, without loading anything.
    fn probe(&self, device: &Device) -> Result<(), InferError>;

    fn load_model(
        &self,
        model: ModelSource,
        device: &Device,
    ) -> Result<Box<dyn Session>, InferError>;
}
