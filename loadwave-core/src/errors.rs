//! Error types for the channel model: framing, encoding, and configuration.

use thiserror::Error;

/// Top-level error type for all `loadwave-core` operations.
#[derive(Debug, Error)]
pub enum LoadwaveError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Frame/encoder-specific errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("packet payload length {len} exceeds maximum of 255 bytes")]
    PacketTooLong { len: usize },

    #[error("cannot encode an empty byte slice with the {encoding} encoder")]
    EmptyInput { encoding: &'static str },
}

/// Channel-parameter validation errors, surfaced to the operator as
/// `InvalidArgument` (see spec.md §7).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("carrier frequency must be > 0 Hz, got {hz}")]
    InvalidCarrierFreq { hz: u32 },

    #[error("bit_periods must be >= 1, got {periods}")]
    InvalidBitPeriods { periods: u32 },

    #[error("core count must be >= 1, got {count}")]
    InvalidCoreCount { count: i32 },

    #[error("bits_per_symbol must be in 1..=4, got {bits}")]
    InvalidBitsPerSymbol { bits: u8 },

    #[error("unknown modulation name '{name}'")]
    UnknownModulation { name: String },

    #[error("unknown encoding name '{name}'")]
    UnknownEncoding { name: String },

    #[error("invalid hex test pattern '{pattern}'")]
    InvalidHexPattern { pattern: String },
}

/// Result type alias for `loadwave-core` operations.
pub type Result<T> = std::result::Result<T, LoadwaveError>;
