//! Optional `tracing` output for hosts that have not installed a subscriber.
//!
//! D-function scans emit an `info` span per call and a `debug` event with
//! the number of records visited and matched. Filter with `RUST_LOG`, e.g.
//! `RUST_LOG=cellcalc_eval=debug`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "cellcalc_eval=warn";

/// Install a global fmt subscriber honouring `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already set.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
