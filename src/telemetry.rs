//! Logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "concrete_strength=info,tower_http=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `DEFAULT_FILTER`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}
