//! Log output.
//!
//! The terminal belongs to the UI, so log records go to a file or nowhere.

use std::{fs::File, io, path::Path, sync::Arc};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a subscriber writing to `path`.
///
/// The filter comes from `RUST_LOG` when set, otherwise from `level`.
pub fn init_file(path: &Path, level: &str) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .with(filter)
        .init();

    Ok(())
}
