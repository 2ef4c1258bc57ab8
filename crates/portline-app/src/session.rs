//! Session wiring.
//!
//! A [`Session`] owns everything the event loop shares with the bridge: the
//! two bounded queues, the stop signal and the bridge task itself. Creating
//! one per run (instead of process-wide queues) keeps the coupling explicit
//! and lets tests run several sessions side by side.

use std::iter;

use thiserror::Error;
use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::{JoinError, JoinHandle},
};
use tokio_util::sync::CancellationToken;

use crate::{Bridge, BridgeConfig, Inbound, LinkError, Port, SerialLink};

/// Capacity of both the outbound and the inbound queue.
pub const QUEUE_CAPACITY: usize = 10;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The bridge is gone and no longer takes outbound lines.
    #[error("outbound queue closed")]
    OutboundClosed,

    /// The bridge task panicked or was cancelled.
    #[error("bridge task failed: {0}")]
    BridgeJoin(#[from] JoinError),

    /// Closing the link failed.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// A running serial session: queues, stop signal and bridge task.
pub struct Session<P: Port> {
    outbound: Sender<String>,
    inbound: Receiver<Inbound>,
    stop: CancellationToken,
    bridge: JoinHandle<SerialLink<P>>,
}

impl<P: Port> Session<P> {
    /// Start the bridge for `link` and return the session that owns it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(link: SerialLink<P>, config: BridgeConfig) -> Self {
        let (outbound, outbound_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (inbound_tx, inbound) = mpsc::channel(QUEUE_CAPACITY);
        let stop = CancellationToken::new();

        let bridge = Bridge::new(link, outbound_rx, inbound_tx, stop.clone(), config).spawn();

        Self { outbound, inbound, stop, bridge }
    }

    /// Enqueue a line for the device, waiting while the queue is full.
    pub async fn enqueue(&self, line: String) -> Result<(), SessionError> {
        self.outbound.send(line).await.map_err(|_| SessionError::OutboundClosed)
    }

    /// Sending half of the outbound queue.
    ///
    /// Lets the event loop wait for queue capacity while it keeps draining
    /// inbound data.
    pub fn outbound(&self) -> Sender<String> {
        self.outbound.clone()
    }

    /// Wait for the next inbound message.
    ///
    /// Returns `None` once the bridge has exited and the queue is empty.
    /// Cancel safe.
    pub async fn next_inbound(&mut self) -> Option<Inbound> {
        self.inbound.recv().await
    }

    /// Every inbound message available right now, without waiting.
    pub fn drain(&mut self) -> impl Iterator<Item = Inbound> + '_ {
        iter::from_fn(|| self.inbound.try_recv().ok())
    }

    /// Whether the stop signal has been raised.
    pub fn is_stopping(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Stop the bridge, wait for it to exit, then close the link.
    ///
    /// The link is closed only after the bridge has released it, and exactly
    /// once since `self` is consumed.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        self.stop.cancel();
        // Unblocks a bridge waiting on a full inbound queue.
        drop(self.inbound);

        let link = self.bridge.await?;
        link.close()?;
        tracing::info!("session closed");
        Ok(())
    }
}
