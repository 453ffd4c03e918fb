// Telemetry provider boundary: device enumeration, capacity and status reads

mod host;
mod nvml;

pub use host::host_info;
pub use nvml::NvmlProvider;

use crate::error::GaugeError;
use crate::models::{DeviceInventory, DeviceStatus};

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("NVML call failed")]
    Nvml(#[from] nvml_wrapper::error::NvmlError),
    #[error("telemetry session already shut down")]
    ShutDown,
    #[error("telemetry lock poisoned")]
    Poisoned,
    #[error("{0}")]
    Unavailable(String),
}

/// Source of per-device readings. Calls may block (FFI), so async callers go
/// through `spawn_blocking`.
pub trait TelemetryProvider: Send + Sync {
    fn device_count(&self) -> Result<u32, TelemetryError>;

    /// Total memory of device `index`, MiB.
    fn device_capacity(&self, index: u32) -> Result<u64, TelemetryError>;

    fn device_status(&self, index: u32) -> Result<DeviceStatus, TelemetryError>;

    fn device_name(&self, index: u32) -> Result<String, TelemetryError> {
        Ok(format!("GPU {index}"))
    }

    /// Ends the session. Calling it again is a no-op.
    fn shutdown(&self) -> Result<(), TelemetryError>;
}

/// Enumerates devices once and sums their capacity. Rejects an empty device
/// set so the sampler never divides by zero.
pub fn discover(provider: &dyn TelemetryProvider) -> Result<DeviceInventory, GaugeError> {
    let device_count = provider.device_count().map_err(GaugeError::ProviderInit)?;
    if device_count == 0 {
        return Err(GaugeError::NoDevices);
    }

    let mut total_capacity = 0u64;
    let mut device_names = Vec::with_capacity(device_count as usize);
    for index in 0..device_count {
        total_capacity += provider
            .device_capacity(index)
            .map_err(GaugeError::ProviderInit)?;
        let name = provider.device_name(index).unwrap_or_else(|e| {
            tracing::debug!(index, error = %e, operation = "device_name", "name unavailable");
            format!("GPU {index}")
        });
        device_names.push(name);
    }

    tracing::info!(device_count, total_capacity_mib = total_capacity, "devices discovered");
    Ok(DeviceInventory {
        device_count,
        total_capacity,
        device_names,
    })
}
