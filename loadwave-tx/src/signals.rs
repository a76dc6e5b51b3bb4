//! SIGINT handling.
//!
//! Unlike the timer tick, SIGINT needs no computation — just a flag flip
//! — so it's handled with a genuine signal callback via `ctrlc` rather
//! than the dedicated-thread substitution used for the timer (spec.md
//! §9).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Installs a process-wide `SIGINT` handler that sets `abort` once. Safe
/// to call at most once per process; `ctrlc` itself enforces that.
pub fn install(abort: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        abort.store(true, Ordering::SeqCst);
    })
    .expect("failed to install SIGINT handler");
}
