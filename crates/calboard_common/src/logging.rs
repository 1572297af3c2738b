// --- File: crates/calboard_common/src/logging.rs ---
//! Logging utilities shared by the Calboard binaries.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default level (INFO).
///
/// Should be called once at the start of the application. `RUST_LOG` still
/// takes precedence through the env filter.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific minimum level.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("calboard={level},tower_http=info")));

    // try_init so tests that initialize logging twice do not panic
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init();
}
