//! Terminal UI for portline
//!
//! A thin shell over [`portline_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`portline_app::Runtime`]
//!
//! This crate only handles terminal rendering and process setup.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod logging;
pub mod terminal;
pub mod ui;

pub use portline_app::{App, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalConfig, TerminalDriver, TerminalError};
