// Shared test helpers: scripted telemetry provider and a recording widget

#![allow(dead_code)]

use gpugauge::error::WidgetError;
use gpugauge::models::{DeviceStatus, Utilization};
use gpugauge::telemetry::{TelemetryError, TelemetryProvider};
use gpugauge::widget::VisualWidget;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn status(power: u32, temperature: u32, gpu: u32, decoder: u32, encoder: u32, memory_used: u64) -> DeviceStatus {
    DeviceStatus {
        power,
        temperature,
        utilization: Utilization {
            gpu,
            decoder,
            encoder,
        },
        memory_used,
    }
}

/// The two devices from the reference scenario; aggregate is
/// {300, 70, 70, 15, 10, 4000}.
pub fn two_devices() -> Vec<DeviceStatus> {
    vec![
        status(100, 60, 50, 10, 5, 1000),
        status(200, 80, 90, 20, 15, 3000),
    ]
}

/// Provider with fixed statuses, optional failing device, and call counters.
pub struct FakeProvider {
    statuses: Mutex<Vec<DeviceStatus>>,
    capacities: Vec<u64>,
    failing: Mutex<Option<u32>>,
    read_delay: Option<Duration>,
    reads: AtomicU64,
    shutdowns: AtomicU64,
}

impl FakeProvider {
    pub fn new(statuses: Vec<DeviceStatus>) -> Self {
        let capacities = vec![8192; statuses.len()];
        Self {
            statuses: Mutex::new(statuses),
            capacities,
            failing: Mutex::new(None),
            read_delay: None,
            reads: AtomicU64::new(0),
            shutdowns: AtomicU64::new(0),
        }
    }

    pub fn with_capacities(mut self, capacities: Vec<u64>) -> Self {
        self.capacities = capacities;
        self
    }

    /// Every `device_status` call blocks its thread for `delay`.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn fail_device(&self, index: u32) {
        *self.failing.lock().unwrap() = Some(index);
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> u64 {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl TelemetryProvider for FakeProvider {
    fn device_count(&self) -> Result<u32, TelemetryError> {
        Ok(self.statuses.lock().unwrap().len() as u32)
    }

    fn device_capacity(&self, index: u32) -> Result<u64, TelemetryError> {
        self.capacities
            .get(index as usize)
            .copied()
            .ok_or_else(|| TelemetryError::Unavailable(format!("no device {index}")))
    }

    fn device_status(&self, index: u32) -> Result<DeviceStatus, TelemetryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.read_delay {
            std::thread::sleep(delay);
        }
        if *self.failing.lock().unwrap() == Some(index) {
            return Err(TelemetryError::Unavailable(format!("device {index} fell off the bus")));
        }
        self.statuses
            .lock()
            .unwrap()
            .get(index as usize)
            .copied()
            .ok_or_else(|| TelemetryError::Unavailable(format!("no device {index}")))
    }

    fn shutdown(&self) -> Result<(), TelemetryError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    Percent(u64),
    Absolute(u64, u64),
}

/// Widget that records every accepted push and applies the gauge's domain rules.
#[derive(Default)]
pub struct RecordingWidget {
    pushes: Mutex<Vec<Push>>,
}

impl RecordingWidget {
    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.lock().unwrap().clone()
    }
}

impl VisualWidget for RecordingWidget {
    fn set_percent(&self, percent: u64) -> Result<(), WidgetError> {
        if percent > 100 {
            return Err(WidgetError::PercentOutOfRange(percent));
        }
        self.pushes.lock().unwrap().push(Push::Percent(percent));
        Ok(())
    }

    fn set_absolute(&self, value: u64, max: u64) -> Result<(), WidgetError> {
        if max == 0 {
            return Err(WidgetError::ZeroMaximum);
        }
        if value > max {
            return Err(WidgetError::AbsoluteOutOfRange { value, max });
        }
        self.pushes.lock().unwrap().push(Push::Absolute(value, max));
        Ok(())
    }
}

/// `Write` sink that tests can read back after handing it to a task.
#[derive(Clone, Default)]
pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
