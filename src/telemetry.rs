//! Opt-in tracing initialization.
//!
//! The engine itself only emits `tracing` events; nothing is printed unless
//! a subscriber is installed. Binaries and tests that want human-readable
//! output can call [`init`] once at startup. Filtering follows the standard
//! `RUST_LOG` conventions (e.g. `RUST_LOG=inevitability=debug`).

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a global `fmt` subscriber honoring `RUST_LOG`.
///
/// Safe to call more than once; subsequent calls are no-ops because the
/// global default can only be set a single time.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
