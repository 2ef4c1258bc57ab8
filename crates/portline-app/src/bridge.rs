//! Serial I/O bridge.
//!
//! The [`Bridge`] is the only code that touches a [`SerialLink`] once the
//! session is running. It polls both directions in one loop so the link has a
//! single owner and reads never race writes on the same handle.
//!
//! # Loop
//!
//! 1. Exit if the stop signal is set. This is the only way out.
//! 2. Write at most one queued outbound line. A failed write becomes an
//!    [`Inbound::Error`] line instead of an error return.
//! 3. Read once, bounded by the port timeout. Timeouts are the normal idle
//!    path; read errors become [`Inbound::Error`] lines; data is forwarded.
//!    A UTF-8 sequence cut off by the end of a read is held back and joined
//!    with the next read.
//! 4. Sleep a short idle backoff when neither direction moved data.

use std::{str, thread, time::Duration};

use tokio::{
    sync::mpsc::{
        Receiver, Sender,
        error::{TryRecvError, TrySendError},
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{Inbound, Port, SerialLink};

/// Size of the read buffer handed to the link.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Payload some devices emit in place of end-of-stream; never displayed.
pub const EOF_SENTINEL: &str = "EOF";

/// Default pause after a poll in which nothing happened.
const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Bridge tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Pause after an idle poll, and between retries on a full inbound queue.
    pub idle_backoff: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { idle_backoff: DEFAULT_IDLE_BACKOFF }
    }
}

/// Background loop moving data between the queues and the serial link.
pub struct Bridge<P: Port> {
    link: SerialLink<P>,
    outbound: Receiver<String>,
    inbound: Sender<Inbound>,
    stop: CancellationToken,
    config: BridgeConfig,
    /// Trailing bytes of an incomplete UTF-8 sequence from the last read.
    carry: Vec<u8>,
}

impl<P: Port> Bridge<P> {
    /// Create a bridge that owns `link`.
    pub fn new(
        link: SerialLink<P>,
        outbound: Receiver<String>,
        inbound: Sender<Inbound>,
        stop: CancellationToken,
        config: BridgeConfig,
    ) -> Self {
        Self { link, outbound, inbound, stop, config, carry: Vec::new() }
    }

    /// Run the loop on a blocking worker thread.
    ///
    /// The handle resolves to the link once the stop signal has been observed.
    pub fn spawn(self) -> JoinHandle<SerialLink<P>> {
        tokio::task::spawn_blocking(move || self.run())
    }

    /// Run the loop on the current thread until the stop signal is set.
    ///
    /// Returns the link so the caller can close it after the bridge is known
    /// to be finished with it.
    pub fn run(mut self) -> SerialLink<P> {
        tracing::debug!(port = %self.link.settings().port_name, "bridge started");
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        while !self.stop.is_cancelled() {
            let wrote = self.pump_outbound();
            let read = self.pump_inbound(&mut buf);

            if !wrote && !read {
                thread::sleep(self.config.idle_backoff);
            }
        }

        tracing::debug!("bridge stopped");
        self.link
    }

    /// Write one pending outbound line, if any. Returns whether a line was
    /// taken from the queue.
    fn pump_outbound(&mut self) -> bool {
        let line = match self.outbound.try_recv() {
            Ok(line) => line,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return false,
        };

        match self.link.write(line.as_bytes()) {
            Ok(()) => tracing::debug!(bytes = line.len(), "line written"),
            Err(e) => {
                tracing::warn!(error = %e, "serial write failed");
                self.push(Inbound::Error(e.to_string()));
            },
        }
        true
    }

    /// Read once from the link. Returns whether anything was pushed.
    fn pump_inbound(&mut self, buf: &mut [u8]) -> bool {
        match self.link.read(buf) {
            Ok(0) => false,
            Ok(n) => {
                self.carry.extend_from_slice(&buf[..n]);
                let payload = decode_utf8(&mut self.carry);
                if payload.is_empty() || payload == EOF_SENTINEL {
                    return false;
                }
                tracing::trace!(bytes = n, "data received");
                self.push(Inbound::Data(payload))
            },
            Err(e) => {
                tracing::warn!(error = %e, "serial read failed");
                self.push(Inbound::Error(e.to_string()))
            },
        }
    }

    /// Push onto the inbound queue, waiting for room while the session runs.
    ///
    /// Gives up when the stop signal is set or the receiver is gone, so a full
    /// queue never holds the bridge past shutdown.
    fn push(&self, message: Inbound) -> bool {
        let mut message = message;
        loop {
            match self.inbound.try_send(message) {
                Ok(()) => return true,
                Err(TrySendError::Full(returned)) => {
                    if self.stop.is_cancelled() {
                        return false;
                    }
                    message = returned;
                    thread::sleep(self.config.idle_backoff);
                },
                Err(TrySendError::Closed(_)) => return false,
            }
        }
    }
}

/// Decode the complete part of `bytes`, leaving an incomplete trailing
/// sequence in place. Invalid bytes become U+FFFD.
fn decode_utf8(bytes: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut rest = bytes.as_slice();

    loop {
        match str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                rest = &[];
                break;
            },
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    },
                    None => {
                        rest = after;
                        break;
                    },
                }
            },
        }
    }

    let carry = rest.to_vec();
    *bytes = carry;
    text
}
