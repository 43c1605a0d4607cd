use crate::{Device, InferError};

/// Pick the first device in `preferences` that `probe` accepts.
///
/// Rejected devices are logged and skipped. When nothing is accepted the
/// result is `Device::Cpu`.
pub fn negotiate(
    preferences: &[Device],
    probe: impl Fn(&Device) -> Result<(), InferError>,
) -> Device {
    for device in preferences {
        match probe(device) {
            Ok(()) => {
                log::info!("selected backend {}", device);
                return device.clone();
            }
            Err(e) => log::warn!("skipping backend {}: {}", device, e),
        }
    }

    log::info!("no preferred backend available, falling back to {}", Device::Cpu);
    Device::Cpu
}
