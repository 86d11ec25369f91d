//! Defines helpers for logging

pub use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::Format};

/// Initialize a logger at the given log level
///
/// The `RUST_LOG` environment variable, if set, refines the filter on top of
/// the given level
pub fn setup_system_logger(level: LevelFilter) {
    tracing_subscriber::fmt()
        .event_format(Format::default().pretty())
        .with_env_filter(env_filter(level))
        .init();
}

/// Initialize a logger that emits newline-delimited JSON
pub fn setup_json_logger(level: LevelFilter) {
    tracing_subscriber::fmt().json().with_env_filter(env_filter(level)).init();
}

/// Build an env filter defaulting to the given level
fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}
