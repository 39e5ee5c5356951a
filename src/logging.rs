//! Logging configuration using tracing
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::NeuroEaseError;

/// Maps the number of `-v` flags to a default filter directive
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise the level follows `verbosity`
/// (`warn` with no `-v`).
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init(verbosity: u8) -> Result<(), NeuroEaseError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| NeuroEaseError::Logging(e.to_string()))
}
