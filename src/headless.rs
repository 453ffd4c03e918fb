// Headless presenter: prints the aggregate on a fixed period instead of
// driving widgets.

use crate::config::HeadlessFormat;
use crate::error::GaugeError;
use crate::models::AggregateSnapshot;
use crate::store::SnapshotReader;
use serde::Serialize;
use std::io::Write;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    total_memory: u64,
    #[serde(flatten)]
    snapshot: &'a AggregateSnapshot,
}

pub fn format_text(snapshot: &AggregateSnapshot, total_capacity: u64) -> String {
    format!(
        "Total VRAM: {total_capacity:5} MB\n\
         Total Power Usage: {:5}W\n\
         Avg Temp: {:5}°\n\
         Avg GPU: {:5}%\n\
         Avg Decoder: {:5}%\n\
         Avg Encoder: {:5}%\n\
         \x20VRAM Usage: {:5} MB\n",
        snapshot.power,
        snapshot.temperature,
        snapshot.gpu_util,
        snapshot.dec_util,
        snapshot.enc_util,
        snapshot.memory_used,
    )
}

/// One JSON object, no trailing newline.
pub fn format_json(
    snapshot: &AggregateSnapshot,
    total_capacity: u64,
) -> serde_json::Result<String> {
    serde_json::to_string(&Report {
        total_memory: total_capacity,
        snapshot,
    })
}

fn render(
    format: HeadlessFormat,
    snapshot: &AggregateSnapshot,
    total_capacity: u64,
) -> Result<String, GaugeError> {
    match format {
        HeadlessFormat::Text => Ok(format_text(snapshot, total_capacity)),
        HeadlessFormat::Json => format_json(snapshot, total_capacity)
            .map(|mut line| {
                line.push('\n');
                line
            })
            .map_err(|e| GaugeError::Task(format!("encoding report: {e}"))),
    }
}

pub struct HeadlessConfig {
    pub format: HeadlessFormat,
    pub period: Duration,
    /// Sum of device memory, MiB.
    pub total_capacity: u64,
}

/// Prints a report every period once the first snapshot has been published.
pub fn spawn<W>(
    reader: SnapshotReader,
    config: HeadlessConfig,
    cancel: CancellationToken,
    mut out: W,
) -> JoinHandle<Result<(), GaugeError>>
where
    W: Write + Send + 'static,
{
    let span = tracing::debug_span!("headless", format = ?config.format);
    tokio::spawn(
        async move {
            let mut tick = interval(config.period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {}
                }
                if reader.generation() == 0 {
                    continue;
                }
                let report = render(config.format, &reader.read(), config.total_capacity)?;

                // A stalled sink blocks a pool thread, not the runtime.
                let write = tokio::task::spawn_blocking(move || {
                    let written = out
                        .write_all(report.as_bytes())
                        .and_then(|()| out.flush());
                    (out, written)
                });
                let (sink, written) = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    joined = write => joined
                        .map_err(|e| GaugeError::Task(format!("report write join: {e}")))?,
                };
                written?;
                out = sink;
            }

            tracing::debug!("Headless printer shutting down");
            Ok::<(), GaugeError>(())
        }
        .instrument(span),
    )
}
