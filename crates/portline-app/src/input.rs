//! Terminal-agnostic keyboard input and the line editor.

/// Maximum number of characters the input field accepts.
const CHAR_LIMIT: usize = 156;

/// Text shown while the input field is empty.
const PLACEHOLDER: &str = "type";

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries so the state machine
/// can be driven from tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (submit line).
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key (cycle modes).
    Tab,
    /// Escape key.
    Esc,
    /// Interrupt (Ctrl+C, quit).
    Interrupt,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Page up key.
    PageUp,
    /// Page down key.
    PageDown,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// Single-line text editor.
///
/// Cursor positions are counted in characters, not bytes.
#[derive(Debug, Clone)]
pub struct InputField {
    buffer: String,
    cursor: usize,
    char_limit: usize,
    placeholder: &'static str,
}

impl Default for InputField {
    fn default() -> Self {
        Self::new()
    }
}

impl InputField {
    /// Create an empty field.
    pub fn new() -> Self {
        Self { buffer: String::new(), cursor: 0, char_limit: CHAR_LIMIT, placeholder: PLACEHOLDER }
    }

    /// Current value.
    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Placeholder shown while empty.
    pub fn placeholder(&self) -> &str {
        self.placeholder
    }

    /// Take the value, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Apply an editing key. Returns `true` if the key was consumed.
    pub fn edit(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Char(c) => {
                if self.len() < self.char_limit {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.insert(at, c);
                    self.cursor += 1;
                }
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            KeyInput::Enter
            | KeyInput::Tab
            | KeyInput::Esc
            | KeyInput::Interrupt
            | KeyInput::Up
            | KeyInput::Down
            | KeyInput::PageUp
            | KeyInput::PageDown => return false,
        }
        true
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.buffer.char_indices().nth(char_index).map_or(self.buffer.len(), |(i, _)| i)
    }
}
