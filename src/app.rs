// One run: discover devices, build the layout, spawn every loop under the
// coordinator and wait for them to stop.

use crate::config::{AppConfig, DisplayMode};
use crate::error::GaugeError;
use crate::headless::{self, HeadlessConfig};
use crate::layout;
use crate::lifecycle::Coordinator;
use crate::presenter;
use crate::sampler::{self, SamplerConfig, SamplerDeps};
use crate::store;
use crate::telemetry::{self, TelemetryProvider};
use crate::ui::{self, Dashboard};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(
    config: &AppConfig,
    provider: Arc<dyn TelemetryProvider>,
    coordinator: Arc<Coordinator>,
) -> Result<(), GaugeError> {
    run_with_output(config, provider, coordinator, std::io::stdout()).await
}

/// Like [`run`], with headless reports written to `out`.
pub async fn run_with_output<W>(
    config: &AppConfig,
    provider: Arc<dyn TelemetryProvider>,
    coordinator: Arc<Coordinator>,
    out: W,
) -> Result<(), GaugeError>
where
    W: Write + Send + 'static,
{
    let inventory = telemetry::discover(provider.as_ref())?;
    let (writer, reader) = store::snapshot_store();
    let cancel = coordinator.token();
    let sampler_deps = SamplerDeps {
        provider,
        device_count: inventory.device_count,
        writer,
        cancel: cancel.clone(),
    };
    let sampler_config = SamplerConfig {
        sample_interval_ms: config.sampling.interval_ms,
    };
    let redraw = Duration::from_millis(config.display.redraw_ms);

    let mut tasks = Vec::new();
    match config.display.mode {
        DisplayMode::Tui => {
            let gauge_configs = if config.gauges.is_empty() {
                layout::default_gauges()
            } else {
                config.gauges.clone()
            };
            let layout = layout::build(&gauge_configs, &inventory)?;
            let dashboard = Dashboard {
                host: telemetry::host_info(),
                inventory,
                gauges: layout.gauges,
            };

            tasks.push(sampler::spawn(sampler_deps, sampler_config));
            for binding in layout.bindings {
                tasks.push(presenter::spawn(binding, reader.clone(), cancel.clone()));
            }
            tasks.push(tokio::spawn(ui::run(dashboard, coordinator.clone(), redraw)));
        }
        DisplayMode::Headless => {
            let headless_config = HeadlessConfig {
                format: config.display.headless_format,
                period: redraw,
                total_capacity: inventory.total_capacity,
            };
            tasks.push(sampler::spawn(sampler_deps, sampler_config));
            tasks.push(headless::spawn(reader, headless_config, cancel.clone(), out));
        }
    }

    tracing::info!(tasks = tasks.len(), mode = ?config.display.mode, "running");
    let signals = coordinator.spawn_signal_listener();
    let result = coordinator.supervise(tasks).await;
    signals.abort();
    result
}
