//! Channel model for the power-line covert load modulation channel.
//!
//! This crate is the part of the system shared by both ends of the link:
//! frame encoding ([`encoding`]), the bit-level frame cursor ([`frame`]),
//! and the ASK/(D)PSK modulator state machine ([`modulator`]) that
//! `loadwave-tx` drives from its timer thread. `loadwave-rx` only uses the
//! error and logging plumbing; it never needs a modulator of its own.

pub mod encoding;
pub mod errors;
pub mod frame;
pub mod logging;
pub mod modulator;
pub mod utils;

pub use encoding::Encoding;
pub use errors::{ConfigError, EncodingError, LoadwaveError};
pub use frame::{Frame, FrameQueue};
pub use modulator::{Modulation, Modulator, ModulatorState};
