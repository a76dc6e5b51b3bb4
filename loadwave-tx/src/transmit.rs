//! Ties the encoder, modulator, timer driver, and load engine together
//! into one transmit call — the Rust analogue of the original tool's
//! `powercom_transmit()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loadwave_core::{FrameQueue, Modulation, Modulator};
use log::info;

use crate::load_engine::LoadEngine;
use crate::scheduler::{self, MAIN_PRIORITY};
use crate::timer::TimerDriver;

/// Parameters that stay fixed for the lifetime of one transmit call.
pub struct TransmitConfig {
    pub carrier_hz: u32,
    pub modulation: Modulation,
    pub bit_periods: u32,
    pub core_count: usize,
    pub external_pid: Option<i32>,
}

/// Runs one complete transmission of `queue` to completion or abort.
///
/// All timer and thread resources are created here and torn down before
/// returning, in strict reverse order (spec.md §3's lifecycle rule).
pub fn transmit(queue: FrameQueue, config: &TransmitConfig, abort: &Arc<AtomicBool>) {
    let interval = config.modulation.tick_interval(config.carrier_hz);
    let modulator = Modulator::new(queue, config.modulation, config.bit_periods);
    let state = modulator.state.clone();

    let main_prio_installed = scheduler::set_realtime_priority(MAIN_PRIORITY);
    let worker_priority = main_prio_installed.then_some(MAIN_PRIORITY - 1);

    let engine = LoadEngine::start(config.core_count, worker_priority);
    let driver = TimerDriver::spawn(modulator, interval, main_prio_installed.then_some(MAIN_PRIORITY));

    // Main pacing loop (spec.md §4.2): level-triggered on `load_asserted`,
    // not edge-triggered, so it tolerates missing a transition by one
    // poll — it just notices the transition one quantum later.
    while !state.done() && !abort.load(Ordering::SeqCst) {
        if !state.load_asserted() {
            if let Some(pid) = config.external_pid {
                send_signal(pid, sigstop());
            }
            let _idle = engine.idle();
            while !state.load_asserted() && !state.done() && !abort.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(10));
            }
            if let Some(pid) = config.external_pid {
                send_signal(pid, sigcont());
            }
            // `_idle` drops here, releasing every worker gate in index order.
        } else {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    if let Some(pid) = config.external_pid {
        send_signal(pid, sigstop());
    }

    driver.request_stop();
    driver.join();
    engine.shutdown();

    if abort.load(Ordering::SeqCst) {
        info!("transmission aborted by SIGINT");
    }
}

#[cfg(target_os = "linux")]
fn send_signal(pid: i32, signal: i32) {
    unsafe {
        libc::kill(pid, signal);
    }
}

#[cfg(not(target_os = "linux"))]
fn send_signal(_pid: i32, _signal: i32) {}

#[cfg(target_os = "linux")]
fn sigstop() -> i32 {
    libc::SIGSTOP
}

#[cfg(not(target_os = "linux"))]
fn sigstop() -> i32 {
    19
}

#[cfg(target_os = "linux")]
fn sigcont() -> i32 {
    libc::SIGCONT
}

#[cfg(not(target_os = "linux"))]
fn sigcont() -> i32 {
    18
}
