// Layout build tests: default gauges, absolute maxima, colour parsing

use gpugauge::config::{GaugeConfig, PlayModeKind};
use gpugauge::error::GaugeError;
use gpugauge::layout::{build, default_gauges};
use gpugauge::models::DeviceInventory;
use gpugauge::presenter::{Metric, PlayMode};
use ratatui::style::Color;
use std::time::Duration;

fn inventory() -> DeviceInventory {
    DeviceInventory {
        device_count: 2,
        total_capacity: 16384,
        device_names: vec!["GPU 0".into(), "GPU 1".into()],
    }
}

#[test]
fn default_layout_has_four_gauges_with_vram_against_total() {
    let layout = build(&default_gauges(), &inventory()).unwrap();
    assert_eq!(layout.gauges.len(), 4);
    assert_eq!(layout.bindings.len(), 4);

    let names: Vec<&str> = layout.bindings.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["GPU Usage", "Decoder", "Encoder", "VRAM"]);

    let vram = &layout.bindings[3];
    assert_eq!(vram.metric, Metric::MemoryUsed);
    assert_eq!(vram.mode, PlayMode::Absolute { max: 16384 });
    assert_eq!(vram.period, Duration::from_secs(1));

    let gpu = layout.gauges[0].options();
    assert_eq!(gpu.fill_color, Color::Red);
    assert_eq!(gpu.height, 3);
    assert_eq!(layout.gauges[3].options().fill_color, Color::Magenta);
}

#[test]
fn label_defaults_to_metric_name() {
    let cfg = GaugeConfig::new(Metric::Temperature, PlayModeKind::Percent);
    let layout = build(&[cfg], &inventory()).unwrap();
    assert_eq!(layout.bindings[0].name, "Temperature");
    assert_eq!(layout.gauges[0].options().label, "Temperature");
}

#[test]
fn explicit_max_wins_over_capacity() {
    let mut cfg = GaugeConfig::new(Metric::MemoryUsed, PlayModeKind::Absolute);
    cfg.max = Some(4096);
    let layout = build(&[cfg], &inventory()).unwrap();
    assert_eq!(layout.bindings[0].mode, PlayMode::Absolute { max: 4096 });
}

#[test]
fn absolute_gauge_without_max_is_rejected() {
    let cfg = GaugeConfig::new(Metric::Power, PlayModeKind::Absolute);
    let err = build(&[cfg], &inventory()).unwrap_err();
    assert!(matches!(err, GaugeError::LayoutBuild(msg) if msg.contains("needs a max")));
}

#[test]
fn vram_without_capacity_is_rejected() {
    let cfg = GaugeConfig::new(Metric::MemoryUsed, PlayModeKind::Absolute);
    let empty = DeviceInventory {
        total_capacity: 0,
        ..inventory()
    };
    assert!(matches!(build(&[cfg], &empty), Err(GaugeError::LayoutBuild(_))));
}

#[test]
fn bad_colour_is_rejected() {
    let mut cfg = GaugeConfig::new(Metric::GpuUtil, PlayModeKind::Percent);
    cfg.fill_color = "ultraviolet".into();
    let err = build(&[cfg], &inventory()).unwrap_err();
    assert!(matches!(err, GaugeError::LayoutBuild(msg) if msg.contains("fill_color")));
}

#[test]
fn empty_gauge_list_is_rejected() {
    assert!(matches!(build(&[], &inventory()), Err(GaugeError::LayoutBuild(_))));
}

#[test]
fn zero_height_is_rejected() {
    let mut cfg = GaugeConfig::new(Metric::GpuUtil, PlayModeKind::Percent);
    cfg.height = 0;
    assert!(matches!(build(&[cfg], &inventory()), Err(GaugeError::LayoutBuild(_))));
}
