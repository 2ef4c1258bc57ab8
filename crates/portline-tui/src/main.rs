//! portline entry point.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::{Parser, error::ErrorKind};
use portline_app::{App, AppConfig, BridgeConfig, DeviceLink, LinkSettings, Runtime, Session};
use portline_tui::{TerminalConfig, TerminalDriver, TerminalError, logging};

/// Interactive serial terminal
#[derive(Parser, Debug)]
#[command(name = "portline")]
#[command(about = "Talk to a serial device from the terminal")]
#[command(version)]
struct Args {
    /// Serial device path (e.g. /dev/ttyUSB0, COM3)
    port: String,

    /// Baud rate
    baud_rate: u32,

    /// Read timeout per device poll, in milliseconds
    #[arg(long, default_value_t = 100)]
    read_timeout_ms: u64,

    /// Draw below the prompt instead of on the alternate screen
    #[arg(long)]
    inline: bool,

    /// Enable Tab to switch between input and read-only history mode
    #[arg(long)]
    history: bool,

    /// Maximum wrap width in columns (0 wraps at the terminal width)
    #[arg(long, default_value_t = 40)]
    wrap_width: u16,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn link_settings(&self) -> LinkSettings {
        LinkSettings::new(&self.port, self.baud_rate)
            .with_read_timeout(Duration::from_millis(self.read_timeout_ms))
    }

    fn app_config(&self) -> AppConfig {
        AppConfig { history_mode: self.history, wrap_width: self.wrap_width }
    }

    fn terminal_config(&self) -> TerminalConfig {
        TerminalConfig { fullscreen: !self.inline, ..TerminalConfig::default() }
    }
}

#[allow(clippy::print_stdout, clippy::print_stderr, reason = "Terminal not yet owned by the UI")]
fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            println!("{e}");
            return ExitCode::FAILURE;
        },
    };

    if let Some(path) = &args.log_file
        && let Err(e) = logging::init_file(path, &args.log_level)
    {
        eprintln!("portline: cannot open log file {}: {e}", path.display());
        return ExitCode::FAILURE;
    }

    let link = match DeviceLink::open(args.link_settings()) {
        Ok(link) => link,
        Err(e) => {
            tracing::error!(error = %e, "failed to open serial port");
            eprintln!("portline: {e}");
            return ExitCode::FAILURE;
        },
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("portline: {e}");
            return ExitCode::FAILURE;
        },
    };

    match runtime.block_on(run(&args, link)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "terminal failure");
            eprintln!("portline: {e}");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: &Args, link: DeviceLink) -> Result<(), TerminalError> {
    let session = Session::start(link, BridgeConfig::default());

    let driver = match TerminalDriver::new(args.terminal_config()) {
        Ok(driver) => driver,
        Err(e) => {
            if let Err(e) = session.shutdown().await {
                tracing::warn!(error = %e, "session shutdown incomplete");
            }
            return Err(e);
        },
    };

    let app = App::new(args.port.clone(), args.baud_rate, args.app_config());
    tracing::info!(port = %args.port, baud_rate = args.baud_rate, "session started");

    Runtime::new(driver, app, session).run().await
}
