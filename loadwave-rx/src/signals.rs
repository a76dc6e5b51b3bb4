//! SIGINT handling: flips an atomic flag the sample loop polls each tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn install(stop: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .expect("failed to install SIGINT handler");
}
