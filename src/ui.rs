// Terminal dashboard: info panel on the left, gauges stacked on the right.
// The redraw loop races its ticker, terminal input and the cancellation token.

use crate::error::GaugeError;
use crate::lifecycle::{Coordinator, ShutdownTrigger};
use crate::models::{DeviceInventory, HostInfo};
use crate::version;
use crate::widget::GaugeWidget;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use futures_util::StreamExt;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};

pub const QUIT_HINT: &str = "PRESS Q TO QUIT";

/// Everything the draw pass needs. Gauges are shared with their presenters.
pub struct Dashboard {
    pub host: HostInfo,
    pub inventory: DeviceInventory,
    pub gauges: Vec<Arc<GaugeWidget>>,
}

/// Maps a terminal event to a shutdown trigger. Raw mode turns Ctrl-C into a
/// key press, so it is handled here as an interrupt.
pub fn key_trigger(event: &Event) -> Option<ShutdownTrigger> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ShutdownTrigger::Interrupt)
        }
        KeyCode::Char('q' | 'Q') => Some(ShutdownTrigger::QuitKey),
        _ => None,
    }
}

pub fn info_lines(dashboard: &Dashboard) -> Vec<Line<'static>> {
    let host = &dashboard.host;
    let inventory = &dashboard.inventory;
    let mut lines = vec![
        Line::styled(
            version::banner(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::raw(format!("Host:    {}", host.host_name)),
        Line::raw(format!("OS:      {}", host.os_version)),
        Line::raw(format!("Kernel:  {}", host.kernel_version)),
        Line::raw(format!("CPUs:    {}", host.logical_cpus)),
        Line::raw(""),
        Line::raw(format!("Devices: {}", inventory.device_count)),
    ];
    lines.extend(
        inventory
            .device_names
            .iter()
            .enumerate()
            .map(|(i, name)| Line::raw(format!("  [{i}] {name}"))),
    );
    lines.push(Line::raw(format!(
        "Total VRAM: {} MB",
        inventory.total_capacity
    )));
    lines
}

pub fn draw(frame: &mut Frame, dashboard: &Dashboard) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(frame.area());

    let info = Paragraph::new(info_lines(dashboard))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Plain)
                .title(QUIT_HINT),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(info, left);

    let mut rows: Vec<Constraint> = dashboard
        .gauges
        .iter()
        .map(|g| Constraint::Length(g.options().height))
        .collect();
    rows.push(Constraint::Min(0));
    let areas = Layout::vertical(rows).split(right);
    for (gauge, area) in dashboard.gauges.iter().zip(areas.iter()) {
        frame.render_widget(gauge.bar(), *area);
    }
}

/// Raw mode + alternate screen for as long as it lives.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        // Restore the terminal before the panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
            original_hook(info);
        }));

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        release_panic_hook();
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

/// Drops the restoring panic hook. `take_hook` panics on a panicking thread,
/// so during unwind the hook is left in place.
fn release_panic_hook() {
    if !std::thread::panicking() {
        let _ = std::panic::take_hook();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Draws until the coordinator's token is cancelled. `q` fires it from here.
pub async fn run(
    dashboard: Dashboard,
    coordinator: Arc<Coordinator>,
    redraw: Duration,
) -> Result<(), GaugeError> {
    let cancel = coordinator.token();
    let mut guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    let mut input_open = true;
    let mut tick = interval(redraw);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                guard.terminal.draw(|f| draw(f, &dashboard))?;
            }
            maybe_event = events.next(), if input_open => match maybe_event {
                Some(Ok(Event::Resize(..))) => {
                    guard.terminal.draw(|f| draw(f, &dashboard))?;
                }
                Some(Ok(event)) => {
                    if let Some(trigger) = key_trigger(&event) {
                        coordinator.trigger(trigger);
                    }
                }
                Some(Err(e)) => return Err(GaugeError::Terminal(e)),
                None => {
                    tracing::debug!("terminal input closed");
                    input_open = false;
                }
            },
        }
    }

    guard.restore()?;
    tracing::debug!("UI shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn quit_key_is_case_insensitive() {
        assert_eq!(
            key_trigger(&key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(ShutdownTrigger::QuitKey)
        );
        assert_eq!(
            key_trigger(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(ShutdownTrigger::QuitKey)
        );
    }

    #[test]
    fn ctrl_c_is_an_interrupt_and_other_keys_are_ignored() {
        assert_eq!(
            key_trigger(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ShutdownTrigger::Interrupt)
        );
        assert_eq!(key_trigger(&key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(key_trigger(&key(KeyCode::Esc, KeyModifiers::NONE)), None);
        assert_eq!(key_trigger(&Event::FocusGained), None);
    }

    #[test]
    fn hook_release_during_unwind_does_not_double_panic() {
        struct ReleaseOnDrop;
        impl Drop for ReleaseOnDrop {
            fn drop(&mut self) {
                release_panic_hook();
            }
        }

        let unwound = std::panic::catch_unwind(|| {
            let _guard = ReleaseOnDrop;
            panic!("draw failed");
        });
        assert!(unwound.is_err());
    }

    #[test]
    fn draw_places_quit_hint_and_gauges() {
        use crate::widget::{GaugeOptions, VisualWidget};
        use ratatui::backend::TestBackend;

        let gauge = Arc::new(
            GaugeWidget::new(GaugeOptions {
                label: "GPU".into(),
                ..GaugeOptions::default()
            })
            .unwrap(),
        );
        gauge.set_percent(100).unwrap();
        let dashboard = Dashboard {
            host: HostInfo::default(),
            inventory: DeviceInventory {
                device_count: 1,
                total_capacity: 8192,
                device_names: vec!["Test GPU".into()],
            },
            gauges: vec![gauge],
        };

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| draw(f, &dashboard)).unwrap();
        let buf = terminal.backend().buffer();

        let top: String = (0..30).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(top.contains(QUIT_HINT));
        // Full gauge in the right half.
        assert_eq!(buf[(30, 0)].bg, ratatui::style::Color::Red);
        assert_eq!(buf[(59, 2)].bg, ratatui::style::Color::Red);
        assert_ne!(buf[(30, 3)].bg, ratatui::style::Color::Red);
    }
}
