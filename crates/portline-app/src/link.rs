//! Serial link.
//!
//! [`SerialLink`] owns an open port exclusively. Writes are line oriented: a
//! [`LINE_TERMINATOR`] is appended to every payload. Reads are bounded by the
//! port's own timeout, and an idle port is reported as zero bytes rather than
//! an error.

use std::{
    io::{self, ErrorKind},
    time::Duration,
};

use thiserror::Error;

/// Terminator appended to every outbound payload.
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Default bound on a single read call.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial link errors.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The port could not be opened (missing device, permissions, busy).
    #[error("cannot open {port} at {baud_rate} baud: {reason}")]
    DeviceUnavailable {
        /// Port path or name.
        port: String,
        /// Requested baud rate.
        baud_rate: u32,
        /// Reason reported by the OS.
        reason: String,
    },

    /// Writing to the device failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// Reading from the device failed.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// Releasing the port failed.
    #[error("close failed: {0}")]
    Close(#[source] io::Error),
}

/// Byte-stream port the link can drive.
///
/// Blanket-implemented for anything readable, writable and sendable, which
/// covers `Box<dyn serialport::SerialPort>` as well as in-memory devices.
pub trait Port: io::Read + io::Write + Send + 'static {}

impl<T: io::Read + io::Write + Send + 'static> Port for T {}

/// Parameters used to open a serial link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Port path (e.g. `/dev/ttyUSB0`, `COM3`).
    pub port_name: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Upper bound on a single read call.
    pub read_timeout: Duration,
}

impl LinkSettings {
    /// Settings for `port_name` at `baud_rate` with the default read timeout.
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self { port_name: port_name.into(), baud_rate, read_timeout: DEFAULT_READ_TIMEOUT }
    }

    /// Override the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// Exclusive owner of an open serial port.
pub struct SerialLink<P: Port> {
    port: P,
    settings: LinkSettings,
}

impl<P: Port> SerialLink<P> {
    /// Wrap an already opened port.
    pub fn new(port: P, settings: LinkSettings) -> Self {
        Self { port, settings }
    }

    /// Settings the link was opened with.
    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Write `payload` followed by [`LINE_TERMINATOR`].
    ///
    /// The payload is written unmodified. Failures are returned to the caller
    /// and never retried.
    pub fn write(&mut self, payload: &[u8]) -> Result<(), LinkError> {
        let mut frame = Vec::with_capacity(payload.len() + LINE_TERMINATOR.len());
        frame.extend_from_slice(payload);
        frame.extend_from_slice(LINE_TERMINATOR);

        self.port.write_all(&frame).map_err(LinkError::Write)?;
        self.port.flush().map_err(LinkError::Write)
    }

    /// Read whatever the device has, waiting at most the port's timeout.
    ///
    /// Returns `Ok(0)` when the read timed out or hit end of stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if is_idle(&e) => Ok(0),
            Err(e) => Err(LinkError::Read(e)),
        }
    }

    /// Flush and release the port.
    ///
    /// Consumes the link, so it can only be closed once.
    pub fn close(mut self) -> Result<(), LinkError> {
        let result = self.port.flush().map_err(LinkError::Close);
        drop(self.port);
        result
    }
}

/// Link over a real serial port.
#[cfg(feature = "serial")]
pub type DeviceLink = SerialLink<Box<dyn serialport::SerialPort>>;

#[cfg(feature = "serial")]
impl DeviceLink {
    /// Open the serial port described by `settings` (8N1, no flow control).
    pub fn open(settings: LinkSettings) -> Result<Self, LinkError> {
        let port = serialport::new(settings.port_name.as_str(), settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| LinkError::DeviceUnavailable {
                port: settings.port_name.clone(),
                baud_rate: settings.baud_rate,
                reason: e.to_string(),
            })?;

        tracing::info!(port = %settings.port_name, baud_rate = settings.baud_rate, "serial port opened");
        Ok(Self::new(port, settings))
    }
}

/// Errors that mean "no data right now" rather than a device failure.
fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted | ErrorKind::UnexpectedEof
    )
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Write};

    use super::*;

    /// Port whose reads fail with a fixed error kind.
    struct FailingPort(ErrorKind);

    impl Read for FailingPort {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "scripted"))
        }
    }

    impl Write for FailingPort {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "scripted"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn settings() -> LinkSettings {
        LinkSettings::new("/dev/null", 9600)
    }

    #[test]
    fn write_appends_terminator() {
        let mut link = SerialLink::new(Cursor::new(Vec::new()), settings());
        link.write(b"ping").unwrap();
        link.write(b"").unwrap();

        assert_eq!(link.port.get_ref().as_slice(), b"ping\n\n");
    }

    #[test]
    fn timeout_reads_as_no_data() {
        for kind in [ErrorKind::TimedOut, ErrorKind::WouldBlock, ErrorKind::UnexpectedEof] {
            let mut link = SerialLink::new(FailingPort(kind), settings());
            let mut buf = [0u8; 8];
            assert_eq!(link.read(&mut buf).unwrap(), 0);
        }
    }

    #[test]
    fn genuine_read_error_is_reported() {
        let mut link = SerialLink::new(FailingPort(ErrorKind::BrokenPipe), settings());
        let mut buf = [0u8; 8];
        assert!(matches!(link.read(&mut buf), Err(LinkError::Read(_))));
    }

    #[test]
    fn write_error_is_reported() {
        let mut link = SerialLink::new(FailingPort(ErrorKind::BrokenPipe), settings());
        assert!(matches!(link.write(b"x"), Err(LinkError::Write(_))));
    }

    #[test]
    fn settings_builder() {
        let settings = LinkSettings::new("COM3", 115_200).with_read_timeout(Duration::from_secs(1));
        assert_eq!(settings.port_name, "COM3");
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.read_timeout, Duration::from_secs(1));
    }
}
