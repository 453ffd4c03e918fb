use crate::presenter::Metric;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GPUGAUGE_CONFIG";
/// Looked up in the working directory when `GPUGAUGE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "gpugauge.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Empty means the built-in layout.
    #[serde(default)]
    pub gauges: Vec<GaugeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_period_ms")]
    pub interval_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_period_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Tui,
    Headless,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlessFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
    /// Terminal redraw cadence, or print cadence in headless mode.
    #[serde(default = "default_period_ms")]
    pub redraw_ms: u64,
    #[serde(default)]
    pub headless_format: HeadlessFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            redraw_ms: default_period_ms(),
            headless_format: HeadlessFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file. Without one, the terminal UI runs with logging off.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayModeKind {
    #[default]
    Percent,
    Absolute,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GaugeConfig {
    pub metric: Metric,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub mode: PlayModeKind,
    /// Absolute mode only. `memory_used` falls back to the total VRAM.
    #[serde(default)]
    pub max: Option<u64>,
    #[serde(default = "default_period_ms")]
    pub refresh_ms: u64,
    #[serde(default = "default_height")]
    pub height: u16,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_filled_text_color")]
    pub filled_text_color: String,
    #[serde(default = "default_empty_text_color")]
    pub empty_text_color: String,
}

impl GaugeConfig {
    /// Gauge with the stock colours and a one second refresh.
    pub fn new(metric: Metric, mode: PlayModeKind) -> Self {
        Self {
            metric,
            label: None,
            mode,
            max: None,
            refresh_ms: default_period_ms(),
            height: default_height(),
            fill_color: default_fill_color(),
            filled_text_color: default_filled_text_color(),
            empty_text_color: default_empty_text_color(),
        }
    }
}

fn default_period_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".into()
}

fn default_height() -> u16 {
    3
}

fn default_fill_color() -> String {
    "red".into()
}

fn default_filled_text_color() -> String {
    "black".into()
}

fn default_empty_text_color() -> String {
    "yellow".into()
}

impl AppConfig {
    /// `GPUGAUGE_CONFIG` if set (must exist), else `gpugauge.toml` if present,
    /// else defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load_from_path(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_path(DEFAULT_CONFIG_PATH)
            }
            Err(_) => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.display.redraw_ms > 0,
            "display.redraw_ms must be > 0, got {}",
            self.display.redraw_ms
        );
        anyhow::ensure!(
            !self.logging.level.trim().is_empty(),
            "logging.level must be non-empty"
        );
        for (i, gauge) in self.gauges.iter().enumerate() {
            anyhow::ensure!(
                gauge.refresh_ms > 0,
                "gauges[{i}].refresh_ms must be > 0, got {}",
                gauge.refresh_ms
            );
            anyhow::ensure!(
                gauge.height > 0,
                "gauges[{i}].height must be > 0, got {}",
                gauge.height
            );
            match gauge.mode {
                PlayModeKind::Percent => anyhow::ensure!(
                    gauge.max.is_none(),
                    "gauges[{i}].max only applies to absolute mode"
                ),
                PlayModeKind::Absolute => anyhow::ensure!(
                    gauge.max != Some(0),
                    "gauges[{i}].max must be > 0"
                ),
            }
        }
        Ok(())
    }
}
