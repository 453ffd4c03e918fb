// Visual widget boundary and the terminal gauge that implements it.

use crate::error::{GaugeError, WidgetError};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use std::sync::{Mutex, PoisonError};

/// Bar/gauge-style indicator that presenters push values into.
pub trait VisualWidget: Send + Sync {
    /// `percent` must be within 0..=100.
    fn set_percent(&self, percent: u64) -> Result<(), WidgetError>;

    /// `value` must be within 0..=max and `max` must be positive.
    fn set_absolute(&self, value: u64, max: u64) -> Result<(), WidgetError>;
}

/// Construction options for a gauge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeOptions {
    /// Rows occupied by the bar.
    pub height: u16,
    pub label: String,
    pub fill_color: Color,
    /// Text colour over the filled part of the bar.
    pub filled_text_color: Color,
    /// Text colour over the empty part of the bar.
    pub empty_text_color: Color,
}

impl Default for GaugeOptions {
    fn default() -> Self {
        Self {
            height: 3,
            label: String::new(),
            fill_color: Color::Red,
            filled_text_color: Color::Black,
            empty_text_color: Color::Yellow,
        }
    }
}

/// Last value pushed into a gauge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fill {
    #[default]
    Empty,
    Percent(u64),
    Absolute { value: u64, max: u64 },
}

impl Fill {
    pub fn ratio(&self) -> f64 {
        match *self {
            Fill::Empty => 0.0,
            Fill::Percent(p) => p as f64 / 100.0,
            Fill::Absolute { value, max } => value as f64 / max as f64,
        }
    }

    fn text(&self, label: &str) -> String {
        let value = match *self {
            Fill::Empty => String::new(),
            Fill::Percent(p) => format!("{p}%"),
            Fill::Absolute { value, max } => format!("{value}/{max}"),
        };
        match (label.is_empty(), value.is_empty()) {
            (true, _) => value,
            (false, true) => label.to_string(),
            (false, false) => format!("{label} {value}"),
        }
    }
}

/// Gauge whose fill is written by a presenter task and read by the draw loop.
#[derive(Debug)]
pub struct GaugeWidget {
    options: GaugeOptions,
    fill: Mutex<Fill>,
}

impl GaugeWidget {
    pub fn new(options: GaugeOptions) -> Result<Self, GaugeError> {
        if options.height == 0 {
            return Err(GaugeError::LayoutBuild(format!(
                "gauge '{}' must be at least one row high",
                options.label
            )));
        }
        Ok(Self {
            options,
            fill: Mutex::new(Fill::Empty),
        })
    }

    pub fn options(&self) -> &GaugeOptions {
        &self.options
    }

    pub fn fill(&self) -> Fill {
        *self.fill.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Renderable view of the current fill.
    pub fn bar(&self) -> GaugeBar<'_> {
        GaugeBar {
            options: &self.options,
            fill: self.fill(),
        }
    }

    fn store(&self, fill: Fill) -> Result<(), WidgetError> {
        let mut guard = self.fill.lock().map_err(|_| WidgetError::Poisoned)?;
        *guard = fill;
        Ok(())
    }
}

impl VisualWidget for GaugeWidget {
    fn set_percent(&self, percent: u64) -> Result<(), WidgetError> {
        if percent > 100 {
            return Err(WidgetError::PercentOutOfRange(percent));
        }
        self.store(Fill::Percent(percent))
    }

    fn set_absolute(&self, value: u64, max: u64) -> Result<(), WidgetError> {
        if max == 0 {
            return Err(WidgetError::ZeroMaximum);
        }
        if value > max {
            return Err(WidgetError::AbsoluteOutOfRange { value, max });
        }
        self.store(Fill::Absolute { value, max })
    }
}

pub struct GaugeBar<'a> {
    options: &'a GaugeOptions,
    fill: Fill,
}

impl Widget for GaugeBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let filled = ((self.fill.ratio() * f64::from(area.width)) as u16).min(area.width);
        let fill_end = area.left() + filled;

        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let bg = if x < fill_end {
                    self.options.fill_color
                } else {
                    Color::Reset
                };
                buf[(x, y)].set_symbol(" ").set_bg(bg);
            }
        }

        let text = self.fill.text(&self.options.label);
        let text_width = text.chars().count() as u16;
        let text_y = area.top() + area.height / 2;
        let start = area.left() + area.width.saturating_sub(text_width) / 2;
        for (x, ch) in (start..area.right()).zip(text.chars()) {
            let fg = if x < fill_end {
                self.options.filled_text_color
            } else {
                self.options.empty_text_color
            };
            buf[(x, text_y)].set_char(ch).set_fg(fg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge(label: &str) -> GaugeWidget {
        GaugeWidget::new(GaugeOptions {
            label: label.into(),
            ..GaugeOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn percent_above_hundred_is_rejected() {
        let g = gauge("GPU Usage");
        assert_eq!(g.set_percent(101), Err(WidgetError::PercentOutOfRange(101)));
        assert_eq!(g.fill(), Fill::Empty);
    }

    #[test]
    fn absolute_checks_maximum() {
        let g = gauge("VRAM");
        assert_eq!(g.set_absolute(1, 0), Err(WidgetError::ZeroMaximum));
        assert_eq!(
            g.set_absolute(9, 8),
            Err(WidgetError::AbsoluteOutOfRange { value: 9, max: 8 })
        );
        g.set_absolute(4, 8).unwrap();
        assert_eq!(g.fill(), Fill::Absolute { value: 4, max: 8 });
        assert_eq!(g.fill().ratio(), 0.5);
    }

    #[test]
    fn zero_height_is_a_layout_error() {
        let err = GaugeWidget::new(GaugeOptions {
            height: 0,
            ..GaugeOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, GaugeError::LayoutBuild(_)));
    }

    #[test]
    fn bar_fills_proportionally_and_colours_text() {
        let g = gauge("");
        g.set_percent(50).unwrap();

        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        g.bar().render(area, &mut buf);

        assert_eq!(buf[(0, 0)].bg, Color::Red);
        assert_eq!(buf[(4, 2)].bg, Color::Red);
        assert_eq!(buf[(5, 0)].bg, Color::Reset);
        assert_eq!(buf[(9, 2)].bg, Color::Reset);

        // "50%" centred on the middle row: columns 3..6
        assert_eq!(buf[(3, 1)].symbol(), "5");
        assert_eq!(buf[(3, 1)].fg, Color::Black);
        assert_eq!(buf[(5, 1)].symbol(), "%");
        assert_eq!(buf[(5, 1)].fg, Color::Yellow);
    }

    #[test]
    fn text_includes_label() {
        assert_eq!(Fill::Percent(70).text("GPU Usage"), "GPU Usage 70%");
        assert_eq!(
            Fill::Absolute { value: 2, max: 8 }.text("VRAM"),
            "VRAM 2/8"
        );
        assert_eq!(Fill::Empty.text("VRAM"), "VRAM");
    }
}
