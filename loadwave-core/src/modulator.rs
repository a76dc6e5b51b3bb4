//! The modulator state machine: ASK and (D)PSK tick handlers driven by a
//! periodic timer, exactly as spec.md §3/§4.2 describes.
//!
//! `ModulatorState` holds only single-word atomics so it can be mutated
//! from whichever context drives ticks — in `loadwave-tx` that is a
//! dedicated timer thread rather than a signal handler (see spec.md §9 and
//! `SPEC_FULL.md` §4.5 for why) — and observed from the main pacing loop
//! without a lock. [`Modulator`] additionally owns the exclusively-mutated
//! [`FrameQueue`]; nothing outside the tick driver ever touches it.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::frame::FrameQueue;

/// Modulation scheme selected with `-M` on the transmitter CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Ask,
    Psk { bits_per_symbol: u8 },
    Dpsk { bits_per_symbol: u8 },
}

impl Modulation {
    pub fn bits_per_symbol(self) -> u8 {
        match self {
            Modulation::Ask => 1,
            Modulation::Psk { bits_per_symbol } | Modulation::Dpsk { bits_per_symbol } => {
                bits_per_symbol
            }
        }
    }

    pub fn is_differential(self) -> bool {
        matches!(self, Modulation::Dpsk { .. })
    }

    fn events_per_period(self) -> u32 {
        1u32 << self.bits_per_symbol()
    }

    /// Timer tick interval: spec.md §4.2.
    ///
    /// ASK ticks twice per carrier period (one per half-period); PSK/DPSK
    /// tick `2^bits_per_symbol` times per carrier period.
    pub fn tick_interval(self, carrier_hz: u32) -> Duration {
        let divisor = match self {
            Modulation::Ask => 2.0,
            _ => self.events_per_period() as f64,
        };
        Duration::from_secs_f64(1.0 / (carrier_hz as f64 * divisor))
    }

    /// Parses the `-M` flag's value, matching the original tool's name
    /// table exactly (see spec.md §6).
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "ask" => Modulation::Ask,
            "bpsk" => Modulation::Psk { bits_per_symbol: 1 },
            "qpsk" => Modulation::Psk { bits_per_symbol: 2 },
            "8psk" => Modulation::Psk { bits_per_symbol: 3 },
            "16psk" => Modulation::Psk { bits_per_symbol: 4 },
            "dbpsk" => Modulation::Dpsk { bits_per_symbol: 1 },
            "dqpsk" => Modulation::Dpsk { bits_per_symbol: 2 },
            "d8psk" => Modulation::Dpsk { bits_per_symbol: 3 },
            "d16psk" => Modulation::Dpsk { bits_per_symbol: 4 },
            other => {
                return Err(ConfigError::UnknownModulation {
                    name: other.to_string(),
                })
            }
        })
    }

    /// Names in the order `-M help` should list them, matching the
    /// original tool's usage text.
    pub const NAMES: [&'static str; 9] = [
        "ask", "bpsk", "qpsk", "8psk", "16psk", "dbpsk", "dqpsk", "d8psk", "d16psk",
    ];
}

/// The observable, cross-thread part of modulator state: spec.md §3's
/// `sig_atomic_t`-equivalent fields.
#[derive(Debug, Default)]
pub struct ModulatorState {
    load_asserted: AtomicBool,
    done: AtomicBool,
    symbol: AtomicU8,
    event_cnt: AtomicU32,
}

impl ModulatorState {
    pub fn new() -> Self {
        Self {
            load_asserted: AtomicBool::new(false),
            done: AtomicBool::new(false),
            symbol: AtomicU8::new(0),
            event_cnt: AtomicU32::new(0),
        }
    }

    /// Current commanded line state: `true` means "assert load" (main
    /// thread should be spinning the worker pool).
    pub fn load_asserted(&self) -> bool {
        self.load_asserted.load(Ordering::SeqCst)
    }

    /// Whether all frames have been transmitted.
    pub fn done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

/// Owns the frame queue and drives it one tick at a time.
///
/// A tick is whatever the caller's timer source produces — in production
/// that's the dedicated timer thread in `loadwave-tx`; in tests it's a
/// direct loop. Either way `tick()` is the entire "handler body" spec.md
/// describes, and it is the only code that ever mutates `queue`.
pub struct Modulator {
    pub state: std::sync::Arc<ModulatorState>,
    queue: FrameQueue,
    modulation: Modulation,
    bit_periods: u32,
}

impl Modulator {
    pub fn new(queue: FrameQueue, modulation: Modulation, bit_periods: u32) -> Self {
        Self {
            state: std::sync::Arc::new(ModulatorState::new()),
            queue,
            modulation,
            bit_periods,
        }
    }

    /// Advances the modulator by one timer tick and returns `true` if
    /// this was the tick that completed the transmission.
    pub fn tick(&mut self) -> bool {
        if self.state.done() {
            return false;
        }
        match self.modulation {
            Modulation::Ask => self.ask_tick(),
            Modulation::Psk { .. } | Modulation::Dpsk { .. } => self.psk_tick(),
        }
    }

    /// ASK tick handler: spec.md §4.2, with OQ-3 applied — the "all
    /// frames transmitted" check happens only after the in-progress bit
    /// has run its full `bit_periods * 2` ticks, never mid-bit.
    fn ask_tick(&mut self) -> bool {
        let bit = match self.queue.peek_bit() {
            Some(b) => b,
            None => {
                // Queue was already drained by a previous tick that
                // completed its bit exactly on this boundary.
                self.state.load_asserted.store(false, Ordering::SeqCst);
                self.state.done.store(true, Ordering::SeqCst);
                return true;
            }
        };

        // OQ-1 (preserved verbatim): a '1' bit toggles the line on every
        // tick; a '0' bit merely ensures the line is asserted high. This
        // is asymmetric ASK, not a symmetric on/off keying.
        if bit {
            let was_asserted = self.state.load_asserted.load(Ordering::SeqCst);
            self.state.load_asserted.store(!was_asserted, Ordering::SeqCst);
        } else if !self.state.load_asserted.load(Ordering::SeqCst) {
            self.state.load_asserted.store(true, Ordering::SeqCst);
        }

        let events = self.event_cnt_incr();
        if events >= self.bit_periods * 2 {
            self.event_cnt_reset();
            self.queue.advance();
            if self.queue.is_empty() {
                // OQ-3: the bit just completed its full duration above,
                // with whatever `load_asserted` value its own toggle rule
                // produced — that value is left standing rather than
                // being forced low, so the last bit is never truncated.
                self.state.done.store(true, Ordering::SeqCst);
                return true;
            }
        }
        false
    }

    /// PSK/DPSK tick handler: spec.md §4.2.
    fn psk_tick(&mut self) -> bool {
        let bits_per_symbol = self.modulation.bits_per_symbol();
        let events_per_period = 1u32 << bits_per_symbol;
        let symbol_period = events_per_period * self.bit_periods;

        let event_cnt = self.state.event_cnt.load(Ordering::SeqCst);
        if event_cnt % symbol_period == 0 {
            if self.queue.is_empty() {
                self.state.load_asserted.store(false, Ordering::SeqCst);
                self.state.done.store(true, Ordering::SeqCst);
                return true;
            }

            let new_bits = self.queue.take_bits(bits_per_symbol);
            let symbol = if self.modulation.is_differential() {
                let prev = self.state.symbol.load(Ordering::SeqCst);
                (prev.wrapping_add(new_bits)) % events_per_period as u8
            } else {
                new_bits
            };
            self.state.symbol.store(symbol, Ordering::SeqCst);
        }

        // Square-wave carrier of period `events_per_period` ticks,
        // phase-rotated by `symbol` ticks (OQ-2, preserved verbatim: this
        // is a tick-unit phase, not a radian one; no Gray-coded
        // symbol-to-phase mapping is applied).
        let symbol = self.state.symbol.load(Ordering::SeqCst) as u32;
        let phase = symbol;
        let asserted = ((event_cnt + phase) % events_per_period) < events_per_period / 2;
        self.state.load_asserted.store(asserted, Ordering::SeqCst);

        self.event_cnt_incr();
        false
    }

    fn event_cnt_incr(&self) -> u32 {
        self.state.event_cnt.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn event_cnt_reset(&self) {
        self.state.event_cnt.store(0, Ordering::SeqCst);
    }

    /// Runs every remaining tick to completion, returning the total tick
    /// count. Intended for tests and for the offline test-signal path;
    /// the real transmitter drives ticks from a timer thread instead.
    pub fn run_to_completion(&mut self) -> u64 {
        let mut ticks = 0u64;
        loop {
            ticks += 1;
            if self.tick() {
                break;
            }
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, FrameQueue};

    fn single_bit_queue(bit: u8) -> FrameQueue {
        FrameQueue::new(vec![Frame::new(bit as u32, 1)])
    }

    /// Testable property #4 / scenario S3: ASK, carrier=30Hz, P=10,
    /// single bit '1' -> 20 ticks, load_asserted toggles every tick,
    /// ending false.
    #[test]
    fn s3_ask_single_one_bit_toggles_every_tick() {
        let q = single_bit_queue(1);
        let mut m = Modulator::new(q, Modulation::Ask, 10);
        let mut toggles = 0;
        let mut prev = m.state.load_asserted();
        let mut ticks = 0;
        loop {
            ticks += 1;
            let done = m.tick();
            let now = m.state.load_asserted();
            if now != prev {
                toggles += 1;
            }
            prev = now;
            if done {
                break;
            }
        }
        assert_eq!(ticks, 20);
        assert_eq!(toggles, 20, "a '1' bit should toggle on every tick");
        assert!(!m.state.load_asserted());
    }

    /// Scenario S4: ASK, single bit '0' -> 20 ticks, load_asserted
    /// remains true throughout (no toggling), per OQ-1.
    #[test]
    fn s4_ask_single_zero_bit_holds_high() {
        let q = single_bit_queue(0);
        let mut m = Modulator::new(q, Modulation::Ask, 10);
        let mut ticks = 0;
        loop {
            ticks += 1;
            let done = m.tick();
            if !done {
                assert!(m.state.load_asserted(), "a '0' bit must hold the line high");
            }
            if done {
                break;
            }
        }
        assert_eq!(ticks, 20);
    }

    /// Testable property #4: over N bits at P periods/bit, ticks = N*P*2.
    #[test]
    fn ask_tick_count_matches_n_times_p_times_two() {
        let q = crate::encoding::encode_raw(b"\x41");
        let mut m = Modulator::new(q, Modulation::Ask, 10);
        let ticks = m.run_to_completion();
        assert_eq!(ticks, 8 * 10 * 2);
    }

    /// Testable property #5: over N symbols, ticks = N*P*2^k.
    #[test]
    fn psk_tick_count_matches_n_times_p_times_two_pow_k() {
        let q = crate::encoding::encode_raw(b"\x41"); // 8 bits -> 4 QPSK symbols
        let mut m = Modulator::new(q, Modulation::Psk { bits_per_symbol: 2 }, 10);
        let ticks = m.run_to_completion();
        assert_eq!(ticks, 4 * 10 * 4);
    }

    /// Testable property #6 / scenario S5: DPSK accumulator. Symbols
    /// [0,1,1,0] with P=10 -> phase indices [0,1,0,0].
    #[test]
    fn s5_dbpsk_phase_accumulates_mod_two() {
        // bits_per_symbol=1 so each input "symbol" is one raw bit; build
        // a frame whose bits are exactly 0,1,1,0.
        let q = FrameQueue::new(vec![crate::frame::Frame::new(0b0110_0000, 8)]);
        let mut m = Modulator::new(q, Modulation::Dpsk { bits_per_symbol: 1 }, 10);

        let mut observed_phases = Vec::new();
        for _ in 0..4 {
            // advance exactly one symbol period (P * 2^1 ticks)
            for _ in 0..(10 * 2) {
                m.tick();
            }
            observed_phases.push(m.state.symbol.load(Ordering::SeqCst));
        }
        assert_eq!(observed_phases, vec![0, 1, 0, 0]);
    }

    #[test]
    fn modulation_name_round_trip() {
        for name in Modulation::NAMES {
            assert!(Modulation::from_name(name).is_ok(), "{name} should parse");
        }
        assert!(Modulation::from_name("bogus").is_err());
    }

    #[test]
    fn tick_interval_ask_is_half_carrier_period() {
        let interval = Modulation::Ask.tick_interval(30);
        assert!((interval.as_secs_f64() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn tick_interval_psk_scales_with_bits_per_symbol() {
        let interval = Modulation::Psk { bits_per_symbol: 2 }.tick_interval(30);
        assert!((interval.as_secs_f64() - 1.0 / (30.0 * 4.0)).abs() < 1e-12);
    }
}
