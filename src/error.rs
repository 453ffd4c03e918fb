// Error taxonomy: every variant here is fatal and never retried.

use crate::telemetry::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum GaugeError {
    /// Telemetry subsystem failed to initialize or enumerate devices.
    #[error("telemetry provider init failed")]
    ProviderInit(#[source] TelemetryError),

    /// Enumeration succeeded but found nothing to average over.
    #[error("no GPU devices found")]
    NoDevices,

    #[error("reading status of device {index} failed")]
    DeviceRead {
        index: u32,
        #[source]
        source: TelemetryError,
    },

    #[error("widget '{label}' rejected a value")]
    WidgetWrite {
        label: String,
        #[source]
        source: WidgetError,
    },

    #[error("layout build failed: {0}")]
    LayoutBuild(String),

    #[error("terminal I/O failed")]
    Terminal(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Task(String),
}

/// Rejections from a Visual Widget push.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("percent {0} is outside 0..=100")]
    PercentOutOfRange(u64),
    #[error("absolute value {value} exceeds maximum {max}")]
    AbsoluteOutOfRange { value: u64, max: u64 },
    #[error("absolute maximum must be > 0")]
    ZeroMaximum,
    #[error("widget state lock poisoned")]
    Poisoned,
}
