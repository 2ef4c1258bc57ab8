//! Test harness for portline.
//!
//! In-memory implementations of the serial port and the terminal driver so the
//! production [`portline_app::Runtime`], [`portline_app::Session`] and
//! [`portline_app::Bridge`] run unchanged in tests.
//!
//! - [`MockDevice`]: scripted reads, captured writes, close counting
//! - [`ScriptedDriver`]: channel-fed events, captured text frames

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod mock_device;
pub mod scripted_driver;

pub use mock_device::{MockDevice, MockPort, MockRead};
pub use scripted_driver::{DriverHandle, ScriptedDriver};
