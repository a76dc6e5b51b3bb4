//! Command-line surface, mirroring the original logger's flag table:
//! `-b` (binary output), `-r RATE`, `-t SEC`, and a positional hiddev path.

use clap::Parser;

const DEFAULT_HIDDEV_PATH: &str = "/dev/usb/hiddev0";
const DEFAULT_RATE_HZ: u32 = 90;
/// The hiddev feature report id the UPS exposes its load telemetry under.
pub const LOAD_REPORT_ID: u32 = 44;

#[derive(Parser, Debug)]
#[command(author, version, about = "Samples UPS load telemetry over USB-HID at a constant rate", long_about = None)]
pub struct Cli {
    /// Write samples as raw little-endian float32 instead of text lines
    #[arg(short = 'b', long = "binary")]
    pub binary: bool,

    /// Sample rate in Hz
    #[arg(short = 'r', long = "rate", default_value_t = DEFAULT_RATE_HZ)]
    pub rate_hz: u32,

    /// Stop sampling after this many seconds
    #[arg(short = 't', long = "time")]
    pub runtime_secs: Option<u64>,

    /// Path to the hiddev node
    #[arg(default_value = DEFAULT_HIDDEV_PATH)]
    pub hiddev_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
