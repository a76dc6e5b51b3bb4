//! Command-line surface: flags mirror the original tool's `getopt` table
//! one-for-one (spec.md §6), dispatched through `clap` instead.

use clap::Parser;
use loadwave_core::{utils, ConfigError, Encoding, Frame, Modulation};

#[derive(Parser, Debug)]
#[command(author, version, about = "Modulates CPU load to ride a covert signal on the AC mains feed", long_about = None)]
pub struct Cli {
    /// Carrier frequency in Hz
    #[arg(short = 'c', long = "carrier", default_value_t = 30)]
    pub carrier_freq: u32,

    /// Number of CPU cores to modulate, or 'all'
    #[arg(short = 'C', long = "cores", default_value = "all")]
    pub core_count: String,

    /// Encoding type to use: none, rs232, packet, or 'help' to list them
    #[arg(short = 'E', long = "encoding", default_value = "packet")]
    pub encoding: String,

    /// Send data contained in file instead of reading stdin
    #[arg(short = 'f', long = "file")]
    pub input_file: Option<String>,

    /// Number of carrier periods to encode one bit
    #[arg(short = 'p', long = "periods", default_value_t = 10)]
    pub bit_periods: u32,

    /// Modulate the running state of an external process alongside the load
    #[arg(short = 'P', long = "pid")]
    pub external_pid: Option<i32>,

    /// Modulation type to use, or 'help' to list them
    #[arg(short = 'M', long = "modulation", default_value = "ask")]
    pub modulation: String,

    /// Continuously transmit this hex pattern as a test signal
    #[arg(short = 't', long = "test-pattern")]
    pub test_pattern: Option<String>,
}

/// The original tool caps `-C all` at 32 cores even when more are online
/// (spec.md §6: "default all up to 32").
const MAX_ALL_CORES: usize = 32;

/// Resolved, validated core count (spec.md §3's `target core count >= 1`).
pub fn resolve_core_count(raw: &str, online: usize) -> Result<usize, ConfigError> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(online.max(1).min(MAX_ALL_CORES));
    }
    let count: i32 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidCoreCount { count: -2 })?;
    if count < 1 {
        return Err(ConfigError::InvalidCoreCount { count });
    }
    Ok(count as usize)
}

/// `-E help` / unknown encoding both print this listing; only the unknown
/// case is a hard error (spec.md §6, matching the original's `-E help`).
pub fn encoding_help_text() -> String {
    let names: Vec<&str> = Encoding::ALL.iter().map(|e| e.as_str()).collect();
    format!("Available Encoding types: {}", names.join(", "))
}

/// `-M help` listing, matching the original tool's `-M help` output.
pub fn modulation_help_text() -> String {
    let names: Vec<&str> = Modulation::NAMES.to_vec();
    format!("Available Modulation types: {}", names.join(", "))
}

/// Builds the single repeated frame `-t HEX` transmits, bypassing the
/// `-E` encoder entirely: `width` is the pattern's own byte-rounded bit
/// width and `value` its bytes packed MSB-first, matching
/// `powercom_send.c`'s `-t` option parser (`test_frame`/`test_frame_len`)
/// rather than any `send_buf_*` framing. `frame_t` there is `uint32_t`,
/// so patterns wider than 4 bytes are out of range.
pub fn build_test_frame(pattern: &str) -> Result<Frame, ConfigError> {
    let bytes = utils::hex_to_bytes(pattern)?;
    if bytes.is_empty() || bytes.len() > 4 {
        return Err(ConfigError::InvalidHexPattern {
            pattern: pattern.to_string(),
        });
    }
    let width = bytes.len() as u8 * 8;
    let value = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
    Ok(Frame::new(value, width))
}
