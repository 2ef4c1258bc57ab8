//! Application side-effects.
//!
//! [`AppAction`] values are instructions produced by the [`crate::App`] state
//! machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Quit the application.
    Quit,

    /// Enqueue a line for the device.
    Send {
        /// Line content without terminator.
        line: String,
    },
}
