//! Real-time scheduling and CPU affinity plumbing.
//!
//! Mirrors the original tool's use of `sched_setscheduler(SCHED_RR, ...)`
//! and `sched_setaffinity` directly via `libc`; there is no higher-level
//! scheduling crate in this corpus, so raw syscalls behind `unsafe` are the
//! idiomatic choice here (see `loadwave-core`'s sibling crates for the
//! equivalent pattern applied to low-level device ioctls).

use log::warn;

/// Default real-time priority for the main/timer thread (spec.md §5).
pub const MAIN_PRIORITY: i32 = 6;

#[cfg(target_os = "linux")]
mod imp {
    use super::*;

    /// Installs `SCHED_RR` at `priority` on the calling thread.
    ///
    /// Returns `true` on success. Failure is non-fatal (spec.md §7's
    /// `PermissionDenied` path): callers should warn once and continue at
    /// normal priority, not abort.
    pub fn set_realtime_priority(priority: i32) -> bool {
        let param = libc::sched_param {
            sched_priority: priority,
        };
        let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_RR, &param) };
        if ret != 0 {
            warn!(
                "failed to set SCHED_RR priority {priority}: {}",
                std::io::Error::last_os_error()
            );
            return false;
        }
        true
    }

    /// Pins the calling thread to a single core.
    pub fn set_affinity(core: usize) -> bool {
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core, &mut set);
            let ret = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
            if ret != 0 {
                warn!(
                    "failed to set CPU affinity to core {core}: {}",
                    std::io::Error::last_os_error()
                );
                return false;
            }
        }
        true
    }

    /// Number of cores the scheduler currently considers online.
    pub fn online_core_count() -> Option<usize> {
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if n < 1 {
            None
        } else {
            Some(n as usize)
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    /// Non-Linux targets have no `SCHED_RR`/affinity equivalent wired up;
    /// callers treat this the same as a permission failure.
    pub fn set_realtime_priority(_priority: i32) -> bool {
        false
    }

    pub fn set_affinity(_core: usize) -> bool {
        false
    }

    pub fn online_core_count() -> Option<usize> {
        std::thread::available_parallelism().ok().map(|n| n.get())
    }
}

pub use imp::{online_core_count, set_affinity, set_realtime_priority};
