//! Generic runtime for application orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Session`]: queues and bridge to the serial link
//! - [`Driver`]: platform-specific terminal I/O
//!
//! Each cycle handles exactly one event (key, resize, tick or inbound data),
//! executes the resulting actions, drains whatever else arrived from the
//! device, then redraws.

use std::iter;

use crate::{App, AppAction, AppEvent, Driver, Port, Session, SessionError};

/// Generic runtime that orchestrates App, Session and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific terminal driver
/// - `P`: Port type owned by the session's serial link
pub struct Runtime<D, P>
where
    D: Driver,
    P: Port,
{
    driver: D,
    app: App,
    session: Session<P>,
}

impl<D, P> Runtime<D, P>
where
    D: Driver,
    P: Port,
{
    /// Create a new runtime from its parts.
    pub fn new(driver: D, app: App, session: Session<P>) -> Self {
        Self { driver, app, session }
    }

    /// Run the main event loop until the App asks to quit.
    ///
    /// On the way out the bridge is stopped before the link is closed, and the
    /// link is closed exactly once. Shutdown failures are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let result = self.event_loop().await;

        if let Some(message) = self.app.fatal() {
            tracing::error!(%message, "session ended by fatal error");
        }
        if let Err(e) = self.session.shutdown().await {
            tracing::warn!(error = %e, "session shutdown incomplete");
        }
        self.driver.stop();

        result
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let actions = tokio::select! {
                event = self.driver.next_event() => self.app.handle(event?),
                message = self.session.next_inbound() => match message {
                    Some(message) => {
                        self.app.drain_inbound(iter::once(message));
                        vec![]
                    },
                    None => self.app.handle(AppEvent::Fatal {
                        message: "serial bridge stopped".to_string(),
                    }),
                },
            };

            let quit = self.process_actions(actions).await?;

            self.app.drain_inbound(self.session.drain());
            self.driver.render(&self.app)?;

            if quit {
                return Ok(());
            }
        }
    }

    /// Execute actions returned by the App. Returns `true` if should quit.
    async fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Quit => return Ok(true),
                AppAction::Send { line } => self.send_line(line).await?,
            }
        }
        Ok(false)
    }

    /// Enqueue a line, waiting for room in the outbound queue.
    ///
    /// While waiting, inbound data keeps being drained and drawn so the bridge
    /// is never stuck behind a full inbound queue.
    async fn send_line(&mut self, line: String) -> Result<(), D::Error> {
        let outbound = self.session.outbound();

        loop {
            tokio::select! {
                permit = outbound.reserve() => {
                    match permit {
                        Ok(permit) => permit.send(line),
                        Err(_) => {
                            let error = SessionError::OutboundClosed;
                            tracing::warn!(error = %error, "dropping outbound line");
                            self.app.push_error(error.to_string());
                        },
                    }
                    return Ok(());
                },
                Some(message) = self.session.next_inbound() => {
                    self.app.drain_inbound(iter::once(message));
                    self.driver.render(&self.app)?;
                },
            }
        }
    }
}
