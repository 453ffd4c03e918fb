// Per-device readings and the startup inventory

use serde::{Deserialize, Serialize};

/// Utilization percentages (0-100) reported by one device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utilization {
    pub gpu: u32,
    pub decoder: u32,
    pub encoder: u32,
}

/// Point-in-time status of a single device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    /// Watts.
    pub power: u32,
    /// Degrees Celsius.
    pub temperature: u32,
    pub utilization: Utilization,
    /// MiB.
    pub memory_used: u64,
}

/// Static facts gathered once at startup. `device_count` is never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInventory {
    pub device_count: u32,
    /// Sum of every device's memory capacity, MiB.
    pub total_capacity: u64,
    pub device_names: Vec<String>,
}
