//! Periodic load-telemetry sampler.
//!
//! Drives [`crate::hid::UsageSource`] at a constant rate and writes each
//! sample out as either a float32 binary stream or one text line — the two
//! output modes the original logger supported. Like `loadwave-tx`'s timer
//! driver, this runs on an ordinary thread with absolute-deadline sleeps
//! rather than a real interval signal, since a signal handler can't safely
//! do the I/O a sample requires.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::warn;

use crate::hid::UsageSource;

/// Binary samples are reported in mA (scaled down from the raw HID usage
/// units), text samples as a percentage — both divisors come from the
/// original logger's fixed-point usage encoding.
const BINARY_SCALE: f32 = 1000.0;
const TEXT_SCALE: f32 = 10.0;

pub struct SamplerConfig {
    pub rate_hz: u32,
    pub binary: bool,
    pub runtime: Option<Duration>,
}

/// Runs the sample loop until `stop` is set or `config.runtime` elapses,
/// writing each sample to `out`.
pub fn run(
    source: &mut dyn UsageSource,
    config: &SamplerConfig,
    stop: &AtomicBool,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let interval = Duration::from_secs_f64(1.0 / config.rate_hz.max(1) as f64);
    let deadline_end = config.runtime.map(|rt| Instant::now() + rt);

    let mut deadline = Instant::now() + interval;
    let mut samples_since_flush: u32 = 0;

    while !stop.load(Ordering::SeqCst) {
        if let Some(end) = deadline_end {
            if Instant::now() >= end {
                break;
            }
        }

        let now = Instant::now();
        if now < deadline {
            std::thread::sleep(deadline - now);
        } else if now > deadline + interval {
            // A tick was already due again before we got to process this
            // one: the sampler fell behind the requested rate.
            warn!("sample rate exceeded: processing could not keep up with {} Hz", config.rate_hz);
        }
        deadline += interval;

        let value = source.read_value()?;
        write_sample(out, value, config.binary)?;

        if config.binary {
            samples_since_flush += 1;
            if samples_since_flush >= config.rate_hz.max(1) {
                out.flush()?;
                samples_since_flush = 0;
            }
        } else {
            out.flush()?;
        }
    }

    out.flush()
}

fn write_sample(out: &mut dyn Write, value: i32, binary: bool) -> std::io::Result<()> {
    if binary {
        let scaled = value as f32 / BINARY_SCALE;
        out.write_all(&scaled.to_le_bytes())
    } else {
        let scaled = value as f32 / TEXT_SCALE;
        write!(out, "load = {scaled:.2} %\n")
    }
}
