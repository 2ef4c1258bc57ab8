//! Application layer for portline
//!
//! Pure UI state machine, serial I/O bridge and generic runtime for an
//! interactive serial terminal. The same code runs against a real serial port
//! in the TUI and against in-memory devices in tests.
//!
//! # Components
//!
//! - [`SerialLink`]: exclusive owner of an open serial port
//! - [`Bridge`]: background loop shuttling bytes between the queues and the
//!   link
//! - [`Session`]: owns the bounded queues, the stop signal and the bridge task
//! - [`App`]: UI state machine (input field, display buffer, modes)
//! - [`Driver`]: trait for platform-specific terminal I/O
//! - [`Runtime`]: event loop tying the App, the Session and a Driver together

#![forbid(unsafe_code)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
mod link;
mod runtime;
mod session;
mod state;
mod wrap;

pub use action::AppAction;
pub use app::{App, AppConfig};
pub use bridge::{Bridge, BridgeConfig, EOF_SENTINEL, READ_BUFFER_SIZE};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{InputField, KeyInput};
pub use link::{LINE_TERMINATOR, LinkError, LinkSettings, Port, SerialLink};
pub use runtime::Runtime;
pub use session::{QUEUE_CAPACITY, Session, SessionError};
pub use state::{ChunkKind, DisplayChunk, Inbound, LineKind, Mode, View, ViewLine};
pub use wrap::wrap_line;

#[cfg(feature = "serial")]
pub use link::DeviceLink;
