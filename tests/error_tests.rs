// Error display tests: each cause appears once in the reported chain

use gpugauge::error::{GaugeError, WidgetError};
use gpugauge::telemetry::TelemetryError;

fn chain(err: GaugeError) -> String {
    format!("{:#}", anyhow::Error::from(err))
}

#[test]
fn device_read_chain_names_cause_once() {
    let err = GaugeError::DeviceRead {
        index: 1,
        source: TelemetryError::Unavailable("fell off the bus".into()),
    };
    assert_eq!(err.to_string(), "reading status of device 1 failed");
    let report = chain(err);
    assert_eq!(report.matches("fell off the bus").count(), 1);
}

#[test]
fn widget_write_chain_names_cause_once() {
    let err = GaugeError::WidgetWrite {
        label: "GPU Usage".into(),
        source: WidgetError::PercentOutOfRange(150),
    };
    let report = chain(err);
    assert!(report.starts_with("widget 'GPU Usage' rejected a value"));
    assert_eq!(report.matches("percent 150").count(), 1);
}

#[test]
fn provider_init_and_terminal_chains_name_cause_once() {
    let report = chain(GaugeError::ProviderInit(TelemetryError::ShutDown));
    assert_eq!(report.matches("already shut down").count(), 1);

    let io = std::io::Error::other("tty gone");
    let report = chain(GaugeError::Terminal(io));
    assert_eq!(report.matches("tty gone").count(), 1);
}
