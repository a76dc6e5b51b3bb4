//! Bitstream conversion helpers shared by the CLI frontends — mainly for
//! turning a `-t HEX` test pattern or a literal message string into the
//! bit vectors the frame encoders expect.

/// Expands `text`'s bytes into individual bits, MSB-first.
pub fn string_to_bitstream(text: &str) -> Vec<u8> {
    text.as_bytes()
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |bit| (byte >> bit) & 1))
        .collect()
}

/// Expands `value`'s low `bits` bits into a bit vector, MSB-first.
pub fn int_to_bitstream(value: u64, bits: usize) -> Vec<u8> {
    assert!(bits > 0, "bit width must be positive");
    if bits < u64::BITS as usize {
        let limit = 1u64.checked_shl(bits as u32).unwrap_or(u64::MAX);
        assert!(value < limit, "value does not fit in bit width");
    }
    (0..bits)
        .rev()
        .map(|bit| ((value >> bit) & 1) as u8)
        .collect()
}

/// Parses a `-t` hex test pattern (e.g. `"DEADBEEF"`) into a byte vector.
/// Odd-length input is left-padded with a `0` nibble, matching how the
/// original tool's `strtoul`-based parser handled a short hex string.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, crate::errors::ConfigError> {
    let cleaned = hex.trim();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(crate::errors::ConfigError::InvalidHexPattern {
            pattern: hex.to_string(),
        });
    }
    let padded = if cleaned.len() % 2 != 0 {
        format!("0{cleaned}")
    } else {
        cleaned.to_string()
    };
    (0..padded.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&padded[i..i + 2], 16).map_err(|_| {
                crate::errors::ConfigError::InvalidHexPattern {
                    pattern: hex.to_string(),
                }
            })
        })
        .collect()
}

/// Packs a bit vector (MSB-first, 8 bits per byte) back into bytes.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1)))
        .collect()
}
