// NVIDIA devices via NVML (libnvidia-ml is loaded at runtime)

use super::{TelemetryError, TelemetryProvider};
use crate::models::{DeviceStatus, Utilization};
use nvml_wrapper::Nvml;
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use std::sync::Mutex;

const MIB: u64 = 1024 * 1024;

pub struct NvmlProvider {
    nvml: Mutex<Option<Nvml>>,
}

impl NvmlProvider {
    pub fn init() -> Result<Self, TelemetryError> {
        let nvml = Nvml::init()?;
        Ok(Self {
            nvml: Mutex::new(Some(nvml)),
        })
    }

    fn with_nvml<T>(
        &self,
        f: impl FnOnce(&Nvml) -> Result<T, TelemetryError>,
    ) -> Result<T, TelemetryError> {
        let guard = self.nvml.lock().map_err(|_| TelemetryError::Poisoned)?;
        let nvml = guard.as_ref().ok_or(TelemetryError::ShutDown)?;
        f(nvml)
    }
}

impl TelemetryProvider for NvmlProvider {
    fn device_count(&self) -> Result<u32, TelemetryError> {
        self.with_nvml(|nvml| Ok(nvml.device_count()?))
    }

    fn device_capacity(&self, index: u32) -> Result<u64, TelemetryError> {
        self.with_nvml(|nvml| {
            let device = nvml.device_by_index(index)?;
            Ok(device.memory_info()?.total / MIB)
        })
    }

    fn device_status(&self, index: u32) -> Result<DeviceStatus, TelemetryError> {
        self.with_nvml(|nvml| {
            let device = nvml.device_by_index(index)?;
            let rates = device.utilization_rates()?;
            let decoder = device.decoder_utilization()?;
            let encoder = device.encoder_utilization()?;
            Ok(DeviceStatus {
                power: device.power_usage()? / 1000,
                temperature: device.temperature(TemperatureSensor::Gpu)?,
                utilization: Utilization {
                    gpu: rates.gpu,
                    decoder: decoder.utilization,
                    encoder: encoder.utilization,
                },
                memory_used: device.memory_info()?.used / MIB,
            })
        })
    }

    fn device_name(&self, index: u32) -> Result<String, TelemetryError> {
        self.with_nvml(|nvml| Ok(nvml.device_by_index(index)?.name()?))
    }

    fn shutdown(&self) -> Result<(), TelemetryError> {
        let mut guard = self.nvml.lock().map_err(|_| TelemetryError::Poisoned)?;
        if let Some(nvml) = guard.take() {
            nvml.shutdown()?;
            tracing::debug!(operation = "nvml_shutdown", "NVML session closed");
        }
        Ok(())
    }
}
