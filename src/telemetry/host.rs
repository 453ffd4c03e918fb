// Host identity via sysinfo

use crate::models::HostInfo;
use sysinfo::System;

pub fn host_info() -> HostInfo {
    let mut sys = System::new();
    sys.refresh_cpu_list(sysinfo::CpuRefreshKind::nothing());
    HostInfo {
        host_name: System::host_name().unwrap_or_else(|| "unknown".into()),
        os_version: System::long_os_version().unwrap_or_else(|| "unknown".into()),
        kernel_version: System::kernel_version().unwrap_or_else(|| "unknown".into()),
        logical_cpus: sys.cpus().len(),
    }
}
