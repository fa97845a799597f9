use tracing_subscriber::EnvFilter;

use complendar_core::logging::default_directives;

/// Initialize tracing based on CLI verbosity level.
///
/// `RUST_LOG` env var overrides the CLI flag if set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        // stdout carries the progress output
        .with_writer(std::io::stderr)
        .init();
}
