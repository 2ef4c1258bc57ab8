//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The serial device is owned by
//! the session, not the driver.

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use portline_app::{App, AppEvent, Driver, KeyInput};
use ratatui::{Terminal, TerminalOptions, Viewport, backend::CrosstermBackend};
use thiserror::Error;
use tokio::time::{Interval, MissedTickBehavior};

use crate::ui;

/// Rows reserved for the inline viewport.
const INLINE_HEIGHT: u16 = 12;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal stopped delivering events.
    #[error("terminal event stream closed")]
    EventStreamClosed,
}

/// Terminal presentation settings.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfig {
    /// Draw on the alternate screen. When `false`, draw in an inline viewport
    /// below the shell prompt.
    pub fullscreen: bool,
    /// How often the input cursor toggles.
    pub blink_interval: Duration,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { fullscreen: true, blink_interval: Duration::from_millis(500) }
    }
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Raw mode is enabled for the driver's lifetime and restored on
/// [`Driver::stop`] or drop, whichever comes first.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    blink: Interval,
    /// Event delivered before reading the terminal (initial size).
    pending: Option<AppEvent>,
    config: TerminalConfig,
    restored: bool,
}

impl TerminalDriver {
    /// Take over the terminal.
    ///
    /// Raw mode is switched off again if any later setup step fails.
    pub fn new(config: TerminalConfig) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        with_rollback(|| Self::take_over(config), || release_terminal(config.fullscreen))
    }

    fn take_over(config: TerminalConfig) -> Result<Self, TerminalError> {
        let backend = CrosstermBackend::new(stdout());
        let mut terminal = if config.fullscreen {
            stdout().execute(EnterAlternateScreen)?;
            Terminal::new(backend)?
        } else {
            Terminal::with_options(backend, TerminalOptions {
                viewport: Viewport::Inline(INLINE_HEIGHT),
            })?
        };

        let area = terminal.get_frame().area();
        let start = tokio::time::Instant::now() + config.blink_interval;
        let mut blink = tokio::time::interval_at(start, config.blink_interval);
        blink.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(fullscreen = config.fullscreen, width = area.width, height = area.height, "terminal ready");

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            blink,
            pending: Some(AppEvent::Resize(area.width, area.height)),
            config,
            restored: false,
        })
    }

    /// Convert a crossterm key event to `KeyInput`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(KeyInput::Interrupt),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::PageUp => Some(KeyInput::PageUp),
            KeyCode::PageDown => Some(KeyInput::PageDown),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;

        release_terminal(self.config.fullscreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Leave raw mode and, when fullscreen, the alternate screen.
fn release_terminal(fullscreen: bool) {
    let _ = disable_raw_mode();
    if fullscreen {
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Run `setup`, calling `rollback` if it fails.
fn with_rollback<T, E>(
    setup: impl FnOnce() -> Result<T, E>,
    rollback: impl FnOnce(),
) -> Result<T, E> {
    setup().inspect_err(|_| rollback())
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn next_event(&mut self) -> Result<AppEvent, Self::Error> {
        if let Some(event) = self.pending.take() {
            return Ok(event);
        }

        loop {
            tokio::select! {
                maybe_event = self.event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            if let Some(input) = Self::convert_key(key) {
                                return Ok(AppEvent::Key(input));
                            }
                        },
                        Some(Ok(Event::Resize(cols, rows))) => {
                            return Ok(AppEvent::Resize(cols, rows));
                        },
                        Some(Ok(_)) => {},
                        Some(Err(e)) => return Err(TerminalError::Io(e)),
                        None => return Err(TerminalError::EventStreamClosed),
                    }
                }

                _ = self.blink.tick() => return Ok(AppEvent::Tick),
            }
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.restore();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.restore();
    }
}
