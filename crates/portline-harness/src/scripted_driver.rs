//! Scripted driver implementing the Driver trait.
//!
//! `ScriptedDriver` provides the same interface as the terminal driver but
//! takes its events from a channel and captures every frame as text, so the
//! production [`portline_app::Runtime`] can run inside a test.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    convert::Infallible,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use portline_app::{App, AppEvent, Driver, KeyInput};
use tokio::sync::mpsc;

/// Poll interval used while waiting for a frame.
const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Default)]
struct Captured {
    frames: Mutex<Vec<String>>,
    stopped: AtomicBool,
}

/// Driver fed by a [`DriverHandle`].
///
/// Frames are rendered at a fixed terminal size. When every handle is gone
/// the driver reports an interrupt key, so a finished script always ends the
/// run.
pub struct ScriptedDriver {
    events: mpsc::UnboundedReceiver<AppEvent>,
    captured: Arc<Captured>,
    size: (u16, u16),
}

/// Test-side handle to a [`ScriptedDriver`].
#[derive(Clone)]
pub struct DriverHandle {
    events: mpsc::UnboundedSender<AppEvent>,
    captured: Arc<Captured>,
}

impl ScriptedDriver {
    /// Create a driver rendering at `width` x `height`, plus its handle.
    pub fn new(width: u16, height: u16) -> (Self, DriverHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let captured = Arc::new(Captured::default());

        let driver = Self { events: rx, captured: Arc::clone(&captured), size: (width, height) };
        (driver, DriverHandle { events: tx, captured })
    }
}

impl DriverHandle {
    /// Deliver an event to the runtime.
    pub fn send(&self, event: AppEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("scripted driver already dropped");
        }
    }

    /// Deliver a key press.
    pub fn key(&self, key: KeyInput) {
        self.send(AppEvent::Key(key));
    }

    /// Type `text` and press Enter.
    pub fn submit(&self, text: &str) {
        for c in text.chars() {
            self.key(KeyInput::Char(c));
        }
        self.key(KeyInput::Enter);
    }

    /// Every frame rendered so far.
    pub fn frames(&self) -> Vec<String> {
        self.captured.frames.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Most recent frame.
    pub fn last_frame(&self) -> Option<String> {
        self.captured.frames.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    /// Wait until a rendered frame satisfies `predicate`.
    pub async fn wait_for_frame(
        &self,
        timeout: Duration,
        predicate: impl Fn(&str) -> bool,
    ) -> Option<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(frame) = self.frames().into_iter().find(|f| predicate(f)) {
                return Some(frame);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(FRAME_POLL_INTERVAL).await;
        }
    }

    /// Whether the runtime has stopped the driver.
    pub fn stopped(&self) -> bool {
        self.captured.stopped.load(Ordering::SeqCst)
    }
}

impl Driver for ScriptedDriver {
    type Error = Infallible;

    async fn next_event(&mut self) -> Result<AppEvent, Self::Error> {
        Ok(self.events.recv().await.unwrap_or(AppEvent::Key(KeyInput::Interrupt)))
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let (width, height) = self.size;
        let frame = app.render(width, height);
        self.captured.frames.lock().unwrap_or_else(PoisonError::into_inner).push(frame);
        Ok(())
    }

    fn stop(&mut self) {
        self.captured.stopped.store(true, Ordering::SeqCst);
    }
}
