// Host identity shown next to the gauges

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub host_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub logical_cpus: usize,
}
