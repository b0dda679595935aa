//! Subscriber setup for hosts that do not install their own.

use tracing_subscriber::EnvFilter;

/// Filter directives are read from this variable.
pub const LOG_ENV: &str = "KHMER_SPELL_LOG";

/// Install a fmt subscriber filtered by `KHMER_SPELL_LOG` (default `info`).
/// Returns false when a global subscriber was already set.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
