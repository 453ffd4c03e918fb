// Layout build: turns gauge configuration into widgets + display bindings.
// Every error here is a LayoutBuild error and happens before any loop starts.

use crate::config::{GaugeConfig, PlayModeKind};
use crate::error::GaugeError;
use crate::models::DeviceInventory;
use crate::presenter::{DisplayBinding, Metric, PlayMode};
use crate::widget::{GaugeOptions, GaugeWidget};
use ratatui::style::Color;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Widgets in display order, plus the bindings that drive them.
#[derive(Debug)]
pub struct Layout {
    pub gauges: Vec<Arc<GaugeWidget>>,
    pub bindings: Vec<DisplayBinding>,
}

/// GPU, decoder and encoder utilization plus VRAM against the total capacity.
pub fn default_gauges() -> Vec<GaugeConfig> {
    let mut gpu = GaugeConfig::new(Metric::GpuUtil, PlayModeKind::Percent);
    gpu.label = Some("GPU Usage".into());

    let mut decoder = GaugeConfig::new(Metric::DecoderUtil, PlayModeKind::Percent);
    decoder.fill_color = "blue".into();
    decoder.empty_text_color = "white".into();

    let mut encoder = GaugeConfig::new(Metric::EncoderUtil, PlayModeKind::Percent);
    encoder.fill_color = "green".into();
    encoder.empty_text_color = "white".into();

    let mut vram = GaugeConfig::new(Metric::MemoryUsed, PlayModeKind::Absolute);
    vram.fill_color = "magenta".into();
    vram.empty_text_color = "white".into();

    vec![gpu, decoder, encoder, vram]
}

pub fn build(configs: &[GaugeConfig], inventory: &DeviceInventory) -> Result<Layout, GaugeError> {
    if configs.is_empty() {
        return Err(GaugeError::LayoutBuild("no gauges configured".into()));
    }

    let mut gauges = Vec::with_capacity(configs.len());
    let mut bindings = Vec::with_capacity(configs.len());
    for cfg in configs {
        let name = cfg
            .label
            .clone()
            .unwrap_or_else(|| cfg.metric.display_name().to_string());
        let widget = Arc::new(GaugeWidget::new(GaugeOptions {
            height: cfg.height,
            label: name.clone(),
            fill_color: parse_color(&name, "fill_color", &cfg.fill_color)?,
            filled_text_color: parse_color(&name, "filled_text_color", &cfg.filled_text_color)?,
            empty_text_color: parse_color(&name, "empty_text_color", &cfg.empty_text_color)?,
        })?);
        let mode = resolve_mode(&name, cfg, inventory)?;

        bindings.push(DisplayBinding {
            name,
            metric: cfg.metric,
            widget: widget.clone(),
            period: Duration::from_millis(cfg.refresh_ms),
            mode,
        });
        gauges.push(widget);
    }

    Ok(Layout { gauges, bindings })
}

fn parse_color(name: &str, key: &str, value: &str) -> Result<Color, GaugeError> {
    Color::from_str(value).map_err(|_| {
        GaugeError::LayoutBuild(format!("gauge '{name}': {key} '{value}' is not a colour"))
    })
}

fn resolve_mode(
    name: &str,
    cfg: &GaugeConfig,
    inventory: &DeviceInventory,
) -> Result<PlayMode, GaugeError> {
    match (cfg.mode, cfg.max, cfg.metric) {
        (PlayModeKind::Percent, _, _) => Ok(PlayMode::Percent),
        (PlayModeKind::Absolute, Some(0), _) => Err(GaugeError::LayoutBuild(format!(
            "gauge '{name}': max must be > 0"
        ))),
        (PlayModeKind::Absolute, Some(max), _) => Ok(PlayMode::Absolute { max }),
        (PlayModeKind::Absolute, None, Metric::MemoryUsed) if inventory.total_capacity > 0 => {
            Ok(PlayMode::Absolute {
                max: inventory.total_capacity,
            })
        }
        (PlayModeKind::Absolute, None, _) => Err(GaugeError::LayoutBuild(format!(
            "gauge '{name}': absolute mode needs a max"
        ))),
    }
}
