//! Worker thread pool: the "load engine" of spec.md §4.3.
//!
//! Each worker pins itself to one core, tries for one priority step below
//! the main thread, and then spends its whole life in `loop { lock; unlock
//! }` on a private mutex. Releasing that mutex IS the command to spin;
//! holding it IS the command to idle — there is deliberately no
//! condition-variable wakeup on the hot path (spec.md §4.3, §9).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::scheduler;

struct Worker {
    gate: Arc<Mutex<()>>,
    handle: JoinHandle<()>,
}

/// Owns one mutex-gated spin loop per targeted core.
pub struct LoadEngine {
    workers: Vec<Worker>,
    stop: Arc<AtomicBool>,
}

impl LoadEngine {
    /// Spawns `core_count` workers, each pinned to core `i` and scheduled
    /// at `worker_priority` (one below the main thread's) when real-time
    /// scheduling is available.
    pub fn start(core_count: usize, worker_priority: Option<i32>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(core_count);

        for core in 0..core_count {
            let gate = Arc::new(Mutex::new(()));
            let worker_gate = gate.clone();
            let worker_stop = stop.clone();
            let handle = thread::Builder::new()
                .name(format!("loadwave-worker-{core}"))
                .spawn(move || worker_body(core, worker_gate, worker_stop, worker_priority))
                .expect("failed to spawn load engine worker thread");
            workers.push(Worker { gate, handle });
        }

        Self { workers, stop }
    }

    /// Acquires every worker's gate in index order and holds it until the
    /// returned guard is dropped, blocking each worker on its next lock
    /// attempt.
    pub fn idle(&self) -> IdleGuard<'_> {
        let guards = self.workers.iter().map(|w| w.gate.lock().unwrap()).collect();
        IdleGuard { _guards: guards }
    }

    /// Signals every worker to exit its spin loop and joins them, in
    /// index order, matching the original tool's cleanup sequence.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        for worker in self.workers.drain(..) {
            let _ = worker.handle.join();
        }
    }
}

/// RAII guard holding every worker's gate; dropping it releases them all.
pub struct IdleGuard<'a> {
    _guards: Vec<std::sync::MutexGuard<'a, ()>>,
}

fn worker_body(core: usize, gate: Arc<Mutex<()>>, stop: Arc<AtomicBool>, priority: Option<i32>) {
    scheduler::set_affinity(core);
    if let Some(priority) = priority {
        scheduler::set_realtime_priority(priority);
    }

    while !stop.load(Ordering::SeqCst) {
        let _lock = gate.lock().unwrap();
        // Dropped immediately: holding the lock here just proves the
        // main thread isn't holding it. If it is, `lock()` above already
        // blocked this worker for the idle duration.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn idle_guard_blocks_workers_until_dropped() {
        let engine = LoadEngine::start(1, None);
        thread::sleep(Duration::from_millis(20));
        {
            let _idle = engine.idle();
            thread::sleep(Duration::from_millis(20));
        }
        engine.shutdown();
    }
}
