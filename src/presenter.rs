// Presenter loops: one per display binding, each on its own period, pushing the
// bound metric from the latest snapshot into its widget.

use crate::error::{GaugeError, WidgetError};
use crate::models::AggregateSnapshot;
use crate::store::SnapshotReader;
use crate::widget::VisualWidget;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Field of the aggregate a binding displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Power,
    Temperature,
    GpuUtil,
    DecoderUtil,
    EncoderUtil,
    MemoryUsed,
}

impl Metric {
    pub fn read(self, snapshot: &AggregateSnapshot) -> u64 {
        match self {
            Metric::Power => snapshot.power,
            Metric::Temperature => u64::from(snapshot.temperature),
            Metric::GpuUtil => u64::from(snapshot.gpu_util),
            Metric::DecoderUtil => u64::from(snapshot.dec_util),
            Metric::EncoderUtil => u64::from(snapshot.enc_util),
            Metric::MemoryUsed => snapshot.memory_used,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Power => "Power (W)",
            Metric::Temperature => "Temperature",
            Metric::GpuUtil => "GPU Usage",
            Metric::DecoderUtil => "Decoder",
            Metric::EncoderUtil => "Encoder",
            Metric::MemoryUsed => "VRAM",
        }
    }
}

/// How a value is pushed into a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Value is already 0-100.
    Percent,
    /// Value out of an explicit maximum.
    Absolute { max: u64 },
}

impl PlayMode {
    pub fn push(self, widget: &dyn VisualWidget, value: u64) -> Result<(), WidgetError> {
        match self {
            PlayMode::Percent => widget.set_percent(value),
            PlayMode::Absolute { max } => widget.set_absolute(value, max),
        }
    }
}

/// A metric wired to a widget. Built once at layout time, never mutated.
#[derive(Clone)]
pub struct DisplayBinding {
    pub name: String,
    pub metric: Metric,
    pub widget: Arc<dyn VisualWidget>,
    pub period: Duration,
    pub mode: PlayMode,
}

impl std::fmt::Debug for DisplayBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayBinding")
            .field("name", &self.name)
            .field("metric", &self.metric)
            .field("period", &self.period)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl DisplayBinding {
    /// Reads the bound metric from `snapshot` and pushes it to the widget.
    pub fn present(&self, snapshot: &AggregateSnapshot) -> Result<(), GaugeError> {
        let value = self.metric.read(snapshot);
        self.mode
            .push(self.widget.as_ref(), value)
            .map_err(|source| GaugeError::WidgetWrite {
                label: self.name.clone(),
                source,
            })
    }
}

pub fn spawn(
    binding: DisplayBinding,
    reader: SnapshotReader,
    cancel: CancellationToken,
) -> JoinHandle<Result<(), GaugeError>> {
    let span = tracing::debug_span!("presenter", name = %binding.name);
    tokio::spawn(
        async move {
            let mut tick = interval(binding.period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {
                        let snapshot = reader.read();
                        if let Err(e) = binding.present(&snapshot) {
                            tracing::error!(error = %e, operation = "push_widget", "widget push failed");
                            return Err(e);
                        }
                    }
                }
            }

            tracing::debug!("Presenter shutting down");
            Ok(())
        }
        .instrument(span),
    )
}
