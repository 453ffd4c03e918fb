// Domain models: device readings, the aggregate snapshot, and static inventory

mod device;
mod host;
mod snapshot;

pub use device::{DeviceInventory, DeviceStatus, Utilization};
pub use host::HostInfo;
pub use snapshot::AggregateSnapshot;
