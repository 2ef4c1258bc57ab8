//! Observable application state types.
//!
//! These structures are the view model of the application: what arrived from
//! the device, which mode the UI is in, and the laid-out lines a frontend
//! draws.

/// UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The input field has focus and receives keystrokes.
    #[default]
    Input,
    /// No text entry; keys navigate the display history.
    ReadOnly,
}

impl Mode {
    /// All modes in cycle order.
    pub const ALL: [Mode; 2] = [Mode::Input, Mode::ReadOnly];

    /// Successor in the mode cycle, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Mode::Input => Mode::ReadOnly,
            Mode::ReadOnly => Mode::Input,
        }
    }

    /// Short label for the status line.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Input => "input",
            Mode::ReadOnly => "read-only",
        }
    }
}

/// Message pushed by the bridge onto the inbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Raw payload read from the device.
    Data(String),
    /// Rendered I/O error.
    Error(String),
}

/// Origin of a display chunk, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Device output.
    Output,
    /// Error line.
    Error,
}

/// One received piece of the display buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayChunk {
    /// Chunk origin.
    pub kind: ChunkKind,
    /// Chunk text as received.
    pub text: String,
}

impl From<Inbound> for DisplayChunk {
    fn from(message: Inbound) -> Self {
        match message {
            Inbound::Data(text) => Self { kind: ChunkKind::Output, text },
            Inbound::Error(text) => Self { kind: ChunkKind::Error, text },
        }
    }
}

/// Role of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Device output.
    Output,
    /// Error output.
    Error,
    /// Port and baud rate status.
    Status,
    /// Input line with a value.
    Input,
    /// Input line showing the placeholder.
    Placeholder,
}

/// A single laid-out line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    /// Line role.
    pub kind: LineKind,
    /// Line text, already wrapped.
    pub text: String,
}

impl ViewLine {
    pub(crate) fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

/// Laid-out frame produced by [`crate::App::view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Lines top to bottom.
    pub lines: Vec<ViewLine>,
    /// Cursor position (column, row) relative to the frame. `None` when the
    /// cursor is hidden.
    pub cursor: Option<(u16, u16)>,
}

impl View {
    /// Plain text of the frame, one line per row.
    pub fn to_text(&self) -> String {
        self.lines.iter().map(|line| line.text.as_str()).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_cycle_wraps() {
        for mode in Mode::ALL {
            let mut cycled = mode;
            for _ in 0..Mode::ALL.len() {
                cycled = cycled.next();
            }
            assert_eq!(cycled, mode);
        }
        assert_eq!(Mode::Input.next(), Mode::ReadOnly);
    }

    #[test]
    fn inbound_maps_to_chunk_kind() {
        let chunk = DisplayChunk::from(Inbound::Error("boom".into()));
        assert_eq!(chunk.kind, ChunkKind::Error);
        assert_eq!(chunk.text, "boom");
    }
}
