use anyhow::Result;
use gpugauge::config::{AppConfig, DisplayMode, LoggingConfig};
use gpugauge::lifecycle::Coordinator;
use gpugauge::telemetry::{NvmlProvider, TelemetryProvider};
use gpugauge::{app, error::GaugeError, version};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Headless logs to stderr (stdout carries reports). The terminal UI logs only
/// to a configured file.
fn init_tracing(logging: &LoggingConfig, mode: DisplayMode) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;
    let (writer, ansi) = match (&logging.file, mode) {
        (Some(path), _) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        (None, DisplayMode::Headless) => (BoxMakeWriter::new(std::io::stderr), true),
        (None, DisplayMode::Tui) => return Ok(()),
    };
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = AppConfig::load()?;
    init_tracing(&app_config.logging, app_config.display.mode)?;
    tracing::info!(
        version = version::VERSION,
        sample_interval_ms = app_config.sampling.interval_ms,
        "{} starting",
        version::NAME
    );

    let provider: Arc<dyn TelemetryProvider> =
        Arc::new(NvmlProvider::init().map_err(GaugeError::ProviderInit)?);
    let coordinator = Arc::new(Coordinator::new());
    {
        let provider = provider.clone();
        coordinator.on_teardown(move || {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, operation = "provider_shutdown", "telemetry shutdown failed");
            }
        });
    }

    let result = app::run(&app_config, provider, coordinator.clone()).await;
    coordinator.teardown();
    result?;

    tracing::info!(trigger = ?coordinator.fired(), "stopped");
    Ok(())
}
