//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the serial terminal completely decoupled from terminal and device
//! I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! inbound device messages and produces [`crate::AppAction`] instructions for
//! the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks the UI mode and the line being edited.
//! - Accumulates device output and error lines in arrival order.
//! - Stores terminal dimensions to handle resize events.
//! - Lays out frames; rendering never mutates state.

use crate::{
    AppAction, AppEvent, ChunkKind, DisplayChunk, Inbound, InputField, KeyInput, LineKind, Mode,
    View, ViewLine,
    wrap::{display_width, split_line, wrap_line},
};

/// Submitted lines that end the session instead of being sent.
const QUIT_COMMANDS: [&str; 2] = ["exit", "quit"];

/// Prompt in front of the input field.
const PROMPT: &str = "> ";

/// Default cap on the wrap width, in columns.
const DEFAULT_WRAP_WIDTH: u16 = 40;

/// UI configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    /// Enable Tab to cycle between [`Mode::Input`] and [`Mode::ReadOnly`].
    pub history_mode: bool,
    /// Upper bound on the wrap width. `0` wraps at the terminal width.
    pub wrap_width: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { history_mode: false, wrap_width: DEFAULT_WRAP_WIDTH }
    }
}

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a terminal or device.
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    /// Port shown in the status line.
    port_name: String,
    /// Baud rate shown in the status line.
    baud_rate: u32,
    mode: Mode,
    /// Received chunks in arrival order.
    display: Vec<DisplayChunk>,
    /// Display buffer split into unwrapped lines, kept in step with `display`.
    log: Vec<ViewLine>,
    /// Whether the last `log` line is output still waiting for its newline.
    log_open: bool,
    input: InputField,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    cursor_visible: bool,
    /// Display rows scrolled back from the bottom.
    scroll: usize,
    /// Set when a fatal condition ended the session.
    fatal: Option<String>,
}

impl App {
    /// Create a new App for the given port.
    pub fn new(port_name: impl Into<String>, baud_rate: u32, config: AppConfig) -> Self {
        Self {
            config,
            port_name: port_name.into(),
            baud_rate,
            mode: Mode::Input,
            display: Vec::new(),
            log: Vec::new(),
            log_open: false,
            input: InputField::new(),
            terminal_size: (80, 24),
            cursor_visible: true,
            scroll: 0,
            fatal: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                self.cursor_visible = !self.cursor_visible;
                vec![]
            },
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                if self.scroll > 0 {
                    self.scroll = self.clamp_scroll(self.scroll);
                }
                vec![]
            },
            AppEvent::Fatal { message } => {
                tracing::error!(%message, "fatal error, quitting");
                self.fatal = Some(message);
                vec![AppAction::Quit]
            },
        }
    }

    /// Process a key press.
    pub fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Interrupt => return vec![AppAction::Quit],
            KeyInput::Enter => return self.submit(),
            KeyInput::Tab if self.config.history_mode => {
                self.mode = self.mode.next();
                self.scroll = 0;
                return vec![];
            },
            _ => {},
        }

        match self.mode {
            Mode::Input => {
                if self.input.edit(key) {
                    self.cursor_visible = true;
                }
                vec![]
            },
            Mode::ReadOnly => self.navigate(key),
        }
    }

    /// Append every available inbound message to the display buffer.
    ///
    /// Returns the number of messages appended.
    pub fn drain_inbound(&mut self, messages: impl IntoIterator<Item = Inbound>) -> usize {
        let before = self.display.len();
        for message in messages {
            self.append(DisplayChunk::from(message));
        }
        self.display.len() - before
    }

    /// Append an error line to the display buffer.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.append(DisplayChunk { kind: ChunkKind::Error, text: message.into() });
    }

    /// Render the frame as plain text for the given terminal size.
    pub fn render(&self, width: u16, height: u16) -> String {
        self.view(width, height).to_text()
    }

    /// Lay out the frame for the given terminal size.
    ///
    /// Display output, the status line and the input line are wrapped to
    /// `min(width, wrap_width)`. With a non-zero `height`, display output is
    /// clipped to the rows left above the status and input lines, and only
    /// those rows (plus the scrollback offset) are wrapped.
    pub fn view(&self, width: u16, height: u16) -> View {
        let wrap = self.wrap_width(width);
        let status = self.status_lines(wrap);
        let input = self.input_lines(wrap);

        let display = if height > 0 {
            let rows = usize::from(height).saturating_sub(status.len() + input.len());
            let mut tail: Vec<ViewLine> =
                self.wrapped_rev(wrap).take(rows.saturating_add(self.scroll)).collect();
            let scroll = self.scroll.min(tail.len().saturating_sub(rows));
            tail.drain(..scroll);
            tail.truncate(rows);
            tail.reverse();
            tail
        } else {
            let mut all: Vec<ViewLine> = self.wrapped_rev(wrap).collect();
            all.reverse();
            all
        };

        let cursor = (self.mode == Mode::Input && self.cursor_visible).then(|| {
            let index = PROMPT.chars().count() + self.input.cursor();
            let (col, row) = cursor_in_rows(&input, index, wrap);
            let row = display.len() + status.len() + row;
            (col as u16, row as u16)
        });

        let mut lines = display;
        lines.extend(status);
        lines.extend(input);

        View { lines, cursor }
    }

    /// Concatenation of every chunk in the display buffer.
    pub fn display_text(&self) -> String {
        self.display.iter().map(|chunk| chunk.text.as_str()).collect()
    }

    /// Received chunks in arrival order.
    pub fn display(&self) -> &[DisplayChunk] {
        &self.display
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The line being edited.
    pub fn input(&self) -> &InputField {
        &self.input
    }

    /// UI configuration.
    pub fn config(&self) -> AppConfig {
        self.config
    }

    /// Port name shown in the status line.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Baud rate shown in the status line.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Whether the blinking cursor is currently shown.
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Display rows scrolled back from the bottom.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Fatal error that ended the session. `None` if none occurred.
    pub fn fatal(&self) -> Option<&str> {
        self.fatal.as_deref()
    }

    /// Submit the input field.
    fn submit(&mut self) -> Vec<AppAction> {
        let value = self.input.value();
        if QUIT_COMMANDS.contains(&value) {
            return vec![AppAction::Quit];
        }
        if value.is_empty() {
            return vec![];
        }

        let line = self.input.take();
        vec![AppAction::Send { line }]
    }

    /// Keys in read-only mode: quit and history navigation.
    fn navigate(&mut self, key: KeyInput) -> Vec<AppAction> {
        let page = self.display_rows().max(1);

        match key {
            KeyInput::Char('q') => return vec![AppAction::Quit],
            KeyInput::Up => self.scroll = self.clamp_scroll(self.scroll + 1),
            KeyInput::Down => self.scroll = self.scroll.saturating_sub(1),
            KeyInput::PageUp => self.scroll = self.clamp_scroll(self.scroll.saturating_add(page)),
            KeyInput::PageDown => self.scroll = self.scroll.saturating_sub(page),
            KeyInput::Home => self.scroll = self.clamp_scroll(usize::MAX),
            KeyInput::End => self.scroll = 0,
            _ => {},
        }
        vec![]
    }

    fn status_text(&self) -> String {
        let status = format!("port: {}, baut rate: {}", self.port_name, self.baud_rate);
        if self.config.history_mode { format!("{status} [{}]", self.mode.label()) } else { status }
    }

    fn status_lines(&self, wrap: usize) -> Vec<ViewLine> {
        wrap_line(&self.status_text(), wrap)
            .into_iter()
            .map(|text| ViewLine::new(LineKind::Status, text))
            .collect()
    }

    fn input_lines(&self, wrap: usize) -> Vec<ViewLine> {
        let (kind, text) = if self.input.value().is_empty() {
            (LineKind::Placeholder, format!("{PROMPT}{}", self.input.placeholder()))
        } else {
            (LineKind::Input, format!("{PROMPT}{}", self.input.value()))
        };
        split_line(&text, wrap).into_iter().map(|line| ViewLine::new(kind, line)).collect()
    }

    fn wrap_width(&self, width: u16) -> usize {
        match (width, self.config.wrap_width) {
            (0, _) => 0,
            (width, 0) => usize::from(width),
            (width, cap) => usize::from(width.min(cap)),
        }
    }

    /// Record a chunk and extend the line log with it.
    ///
    /// Error chunks always occupy their own lines; output continues on a fresh
    /// line after an error.
    fn append(&mut self, chunk: DisplayChunk) {
        match chunk.kind {
            ChunkKind::Output => {
                let text = chunk.text.replace('\r', "");
                let mut parts = text.split('\n');
                if let Some(first) = parts.next() {
                    if !self.log_open {
                        self.log.push(ViewLine::new(LineKind::Output, ""));
                        self.log_open = true;
                    }
                    if let Some(open) = self.log.last_mut() {
                        open.text.push_str(first);
                    }
                }
                for part in parts {
                    self.log.push(ViewLine::new(LineKind::Output, part));
                }
            },
            ChunkKind::Error => {
                if self.log_open && self.log.last().is_some_and(|line| line.text.is_empty()) {
                    self.log.pop();
                }
                self.log_open = false;
                self.log.extend(chunk.text.lines().map(|line| ViewLine::new(LineKind::Error, line)));
            },
        }
        self.display.push(chunk);
    }

    /// Logged lines, minus an open output line that has no text yet.
    fn log_lines(&self) -> &[ViewLine] {
        match self.log.split_last() {
            Some((last, rest)) if self.log_open && last.text.is_empty() => rest,
            _ => &self.log,
        }
    }

    /// Wrapped display lines from the bottom up.
    fn wrapped_rev(&self, wrap: usize) -> impl Iterator<Item = ViewLine> + '_ {
        self.log_lines().iter().rev().flat_map(move |line| {
            let kind = line.kind;
            wrap_line(&line.text, wrap).into_iter().rev().map(move |text| ViewLine::new(kind, text))
        })
    }

    /// Rows available for display output at the current terminal size.
    fn display_rows(&self) -> usize {
        let (width, height) = self.terminal_size;
        let wrap = self.wrap_width(width);
        let chrome = self.status_lines(wrap).len() + self.input_lines(wrap).len();
        usize::from(height).saturating_sub(chrome)
    }

    /// Largest offset up to `wanted` that still leaves a full page of output.
    ///
    /// Wraps only as many lines as the offset can reach.
    fn clamp_scroll(&self, wanted: usize) -> usize {
        let rows = self.display_rows();
        let wrap = self.wrap_width(self.terminal_size.0);
        let available = self.wrapped_rev(wrap).take(rows.saturating_add(wanted)).count();
        wanted.min(available.saturating_sub(rows))
    }
}

/// Cursor (column, row) for character `index` of the split input rows.
fn cursor_in_rows(rows: &[ViewLine], index: usize, wrap: usize) -> (usize, usize) {
    let mut remaining = index;
    for (row, line) in rows.iter().enumerate() {
        let chars = line.text.chars().count();
        if remaining < chars {
            let before: String = line.text.chars().take(remaining).collect();
            return (display_width(&before), row);
        }
        remaining -= chars;
    }

    // Past the last character: stay on the last row unless it is full.
    let last = rows.len().saturating_sub(1);
    let used = rows.last().map_or(0, |line| display_width(&line.text));
    if wrap > 0 && used >= wrap { (0, last + 1) } else { (used, last) }
}
