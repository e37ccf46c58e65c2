//! Progress logging utilities.

use std::time::Instant;

use log::info;

use crate::discovery::DiscoveryProgress;

/// Logs progress information about a discovery run.
///
/// # Arguments
///
/// * `start_time` - When discovery started
/// * `progress` - Counters updated by the pipeline
pub fn log_progress(start_time: Instant, progress: &DiscoveryProgress) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let checked = progress.ports_checked();
    let rate = if elapsed_secs > 0.0 {
        checked as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Checked {} port(s) ({} open), retrieved {} chain(s) in {:.2} seconds (~{:.2} ports/sec)",
        checked,
        progress.open_ports(),
        progress.chains_retrieved(),
        elapsed_secs,
        rate
    );
}
