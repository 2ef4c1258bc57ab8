//! In-memory serial device.
//!
//! A [`MockDevice`] is the test's view of the device; the [`MockPort`] it
//! hands out is what the [`SerialLink`] owns. Both share one state, so the
//! test can script reads and inspect writes while the bridge runs.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    io::{self, Read, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread,
    time::Duration,
};

use portline_app::{LinkSettings, SerialLink};

/// One scripted response to a read call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRead {
    /// Bytes the device sends.
    Data(Vec<u8>),
    /// Read fails with this error kind.
    Error(io::ErrorKind),
}

#[derive(Default)]
struct DeviceState {
    reads: VecDeque<MockRead>,
    writes: Vec<Vec<u8>>,
    fail_writes: bool,
    /// How long an unscripted read blocks before timing out.
    read_timeout: Duration,
    read_calls: usize,
    closes: usize,
}

/// Scripted serial device.
///
/// Reads pop scripted responses; an empty script reads as a timeout.
#[derive(Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    /// Create a device with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// A serial link over this device.
    pub fn link(&self, port_name: &str, baud_rate: u32) -> SerialLink<MockPort> {
        SerialLink::new(self.port(), LinkSettings::new(port_name, baud_rate))
    }

    /// A port handle sharing this device's state.
    pub fn port(&self) -> MockPort {
        MockPort { state: Arc::clone(&self.state) }
    }

    /// Queue bytes for a future read.
    pub fn push_read(&self, data: impl Into<Vec<u8>>) {
        self.lock().reads.push_back(MockRead::Data(data.into()));
    }

    /// Queue a failing read.
    pub fn push_read_error(&self, kind: io::ErrorKind) {
        self.lock().reads.push_back(MockRead::Error(kind));
    }

    /// Block unscripted reads for `timeout`, like a real port with nothing to
    /// deliver. Zero (the default) times out immediately.
    pub fn set_read_timeout(&self, timeout: Duration) {
        self.lock().read_timeout = timeout;
    }

    /// Make every following write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Successful writes, one entry per write call.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// All bytes written so far.
    pub fn written(&self) -> Vec<u8> {
        self.lock().writes.concat()
    }

    /// Number of read calls made by the link.
    pub fn read_calls(&self) -> usize {
        self.lock().read_calls
    }

    /// Number of times a port handle was released.
    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Port handle owned by the serial link.
///
/// Dropping it counts as closing the device.
pub struct MockPort {
    state: Arc<Mutex<DeviceState>>,
}

impl MockPort {
    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.lock();
        state.read_calls += 1;

        let next = state.reads.pop_front();
        match next {
            Some(MockRead::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    state.reads.push_front(MockRead::Data(data.split_off(n)));
                }
                Ok(n)
            },
            Some(MockRead::Error(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None => {
                let timeout = state.read_timeout;
                drop(state);
                thread::sleep(timeout);
                Err(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"))
            },
        }
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        state.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MockPort {
    fn drop(&mut self) {
        self.lock().closes += 1;
    }
}
