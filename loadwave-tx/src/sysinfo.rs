//! Startup diagnostics that have nothing to do with modulation itself.

use std::fs;

use log::warn;

const GOVERNOR_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor";

/// Warns on stderr (via the log crate) if the CPU frequency scaling
/// governor is not `"performance"`. Missing the file entirely (common in
/// containers or on non-Linux hosts) is silently ignored, matching the
/// original tool's `fopen` failure path.
pub fn check_cpu_governor() {
    let Ok(contents) = fs::read_to_string(GOVERNOR_PATH) else {
        return;
    };
    let governor = contents.trim();
    if governor != "performance" {
        warn!("CPU frequency scaling governor is '{governor}', not 'performance'");
    }
}
