//! Application input events.
//!
//! [`AppEvent`] is the set of inputs that drive the [`crate::App`] state
//! machine. Device data does not arrive as an event; it is drained from the
//! inbound queue with [`crate::App::drain_inbound`].

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick (cursor blink).
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Unrecoverable condition raised outside the App.
    Fatal {
        /// Error description.
        message: String,
    },
}
