// Background sampler: polls every device on a fixed period, reduces the readings
// into one aggregate and publishes it. Any failed device read ends the loop.

use crate::error::GaugeError;
use crate::models::{AggregateSnapshot, DeviceStatus};
use crate::store::SnapshotWriter;
use crate::telemetry::TelemetryProvider;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub struct SamplerDeps {
    pub provider: Arc<dyn TelemetryProvider>,
    /// Device count validated at startup; never zero.
    pub device_count: u32,
    pub writer: SnapshotWriter,
    pub cancel: CancellationToken,
}

pub struct SamplerConfig {
    pub sample_interval_ms: u64,
}

/// Sums power and memory; averages temperature and utilization with
/// truncating integer division over `statuses.len()`.
pub fn reduce(statuses: &[DeviceStatus]) -> Result<AggregateSnapshot, GaugeError> {
    if statuses.is_empty() {
        return Err(GaugeError::NoDevices);
    }
    let count = statuses.len() as u64;

    let mut power = 0u64;
    let mut memory_used = 0u64;
    let mut temperature = 0u64;
    let mut gpu_util = 0u64;
    let mut dec_util = 0u64;
    let mut enc_util = 0u64;
    for st in statuses {
        power += u64::from(st.power);
        memory_used += st.memory_used;
        temperature += u64::from(st.temperature);
        gpu_util += u64::from(st.utilization.gpu);
        dec_util += u64::from(st.utilization.decoder);
        enc_util += u64::from(st.utilization.encoder);
    }

    Ok(AggregateSnapshot {
        power,
        temperature: (temperature / count) as u32,
        gpu_util: (gpu_util / count) as u32,
        dec_util: (dec_util / count) as u32,
        enc_util: (enc_util / count) as u32,
        memory_used,
    })
}

fn read_all(
    provider: &dyn TelemetryProvider,
    device_count: u32,
) -> Result<Vec<DeviceStatus>, GaugeError> {
    (0..device_count)
        .map(|index| {
            provider
                .device_status(index)
                .map_err(|source| GaugeError::DeviceRead { index, source })
        })
        .collect()
}

/// Reads every device once (off the async workers) and reduces the result.
pub async fn sample_once(
    provider: Arc<dyn TelemetryProvider>,
    device_count: u32,
) -> Result<AggregateSnapshot, GaugeError> {
    let statuses = tokio::task::spawn_blocking(move || read_all(provider.as_ref(), device_count))
        .await
        .map_err(|e| GaugeError::Task(format!("device read join: {e}")))??;
    reduce(&statuses)
}

pub fn spawn(deps: SamplerDeps, config: SamplerConfig) -> JoinHandle<Result<(), GaugeError>> {
    let SamplerDeps {
        provider,
        device_count,
        writer,
        cancel,
    } = deps;
    let SamplerConfig { sample_interval_ms } = config;

    let span = tracing::debug_span!("sampler", sample_interval_ms, device_count);
    tokio::spawn(
        async move {
            let mut tick = interval(Duration::from_millis(sample_interval_ms));
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {}
                }

                // An in-flight read is abandoned on cancellation.
                let sampled = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    r = sample_once(provider.clone(), device_count) => r,
                };
                let snapshot = match sampled {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!(error = %e, operation = "sample_devices", "device read failed");
                        return Err(e);
                    }
                };
                if cancel.is_cancelled() {
                    break;
                }
                writer.publish(snapshot);
                tracing::trace!(
                    generation = writer.generation(),
                    power = snapshot.power,
                    gpu_util = snapshot.gpu_util,
                    "snapshot published"
                );
            }

            tracing::debug!(publishes = writer.generation(), "Sampler shutting down");
            Ok(())
        }
        .instrument(span),
    )
}
