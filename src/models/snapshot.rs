// Aggregate snapshot: one reduced reading across all devices

use serde::{Deserialize, Serialize};

/// Summed/averaged telemetry across every device at one sampling instant.
///
/// `power` and `memory_used` are sums; the rest are truncated means over the
/// device count. Published wholesale, never patched field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    pub power: u64,
    pub temperature: u32,
    pub gpu_util: u32,
    pub dec_util: u32,
    pub enc_util: u32,
    pub memory_used: u64,
}
