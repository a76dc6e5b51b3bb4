//! Periodic tick driver.
//!
//! spec.md §9 licenses replacing the original's `SIGALRM` handler with a
//! dedicated high-priority thread blocked on absolute-deadline sleeps,
//! since mutating arbitrary state from a real Rust signal handler isn't
//! sound. This thread's body is exactly the tick handler body — see
//! `loadwave_core::modulator::Modulator::tick`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use loadwave_core::Modulator;

use crate::scheduler;

/// Drives `modulator.tick()` at a fixed interval on its own thread until
/// the modulator reports `done` or `stop` is requested.
pub struct TimerDriver {
    handle: JoinHandle<()>,
    stop: Arc<AtomicBool>,
}

impl TimerDriver {
    pub fn spawn(mut modulator: Modulator, interval: Duration, priority: Option<i32>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name("loadwave-timer".into())
            .spawn(move || {
                if let Some(priority) = priority {
                    scheduler::set_realtime_priority(priority);
                }
                run(&mut modulator, interval, &thread_stop);
            })
            .expect("failed to spawn timer driver thread");

        Self { handle, stop }
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn join(self) {
        let _ = self.handle.join();
    }
}

fn run(modulator: &mut Modulator, interval: Duration, stop: &AtomicBool) {
    let mut deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        let done = modulator.tick();
        if done {
            return;
        }

        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        // Always step from the previous absolute deadline, never from
        // `now`, so a late tick doesn't drag every subsequent one with it.
        deadline += interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadwave_core::{encoding::encode_raw, Modulation};

    #[test]
    fn driver_runs_modulator_to_completion() {
        let queue = encode_raw(b"\x41");
        let modulator = Modulator::new(queue, Modulation::Ask, 1);
        let state = modulator.state.clone();
        let driver = TimerDriver::spawn(modulator, Duration::from_micros(50), None);
        driver.join();
        assert!(state.done());
    }
}
