//! Driver trait for abstracting terminal I/O.
//!
//! The [`Driver`] trait decouples the event loop from a specific terminal
//! library. Each frontend implements it, while the generic [`crate::Runtime`]
//! handles all orchestration.

use std::future::Future;

use crate::{App, AppEvent};

/// Abstracts terminal I/O for the application runtime.
///
/// # Implementations
///
/// - **TUI**: crossterm events and a ratatui frame
/// - **Tests**: channel-fed events and captured text frames
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input event (key, resize or tick).
    ///
    /// Must be cancel safe: the runtime races it against inbound device data.
    fn next_event(&mut self) -> impl Future<Output = Result<AppEvent, Self::Error>> + Send;

    /// Draw the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Restore the terminal and release resources.
    fn stop(&mut self);
}
