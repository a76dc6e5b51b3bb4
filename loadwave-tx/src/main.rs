use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use loadwave_core::{logging, Encoding, FrameQueue, Modulation};

use loadwave_tx::cli::{self, Cli};
use loadwave_tx::transmit::{self, TransmitConfig};
use loadwave_tx::{scheduler, signals, sysinfo};

/// The original tool's file/stdin chunk size, preserved for parity with
/// `MAX_PKT_LEN` — each chunk becomes one independent transmit call.
const CHUNK_LEN: usize = 255;

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init_logger();
    let cli = Cli::parse();

    if cli.encoding.eq_ignore_ascii_case("help") {
        println!("{}", cli::encoding_help_text());
        return Ok(());
    }
    if cli.modulation.eq_ignore_ascii_case("help") {
        println!("{}", cli::modulation_help_text());
        return Ok(());
    }

    let encoding: Encoding = cli.encoding.parse().map_err(|e| eyre!("{e}"))?;
    let modulation = Modulation::from_name(&cli.modulation).map_err(|e| eyre!("{e}"))?;

    if cli.carrier_freq == 0 {
        return Err(eyre!(loadwave_core::ConfigError::InvalidCarrierFreq { hz: 0 }));
    }
    if cli.bit_periods == 0 {
        return Err(eyre!(loadwave_core::ConfigError::InvalidBitPeriods { periods: 0 }));
    }

    sysinfo::check_cpu_governor();

    let online = scheduler::online_core_count().unwrap_or(1);
    let core_count = cli::resolve_core_count(&cli.core_count, online).map_err(|e| eyre!("{e}"))?;

    let abort = Arc::new(AtomicBool::new(false));
    signals::install(abort.clone());

    let config = TransmitConfig {
        carrier_hz: cli.carrier_freq,
        modulation,
        bit_periods: cli.bit_periods,
        core_count,
        external_pid: cli.external_pid,
    };

    let bps = cli.carrier_freq / cli.bit_periods * modulation.bits_per_symbol() as u32;

    if let Some(pattern) = &cli.test_pattern {
        // Repeats one raw frame (bypassing the `-E` encoder entirely)
        // 1024 times per transmit call, matching `powercom_send.c`'s
        // `send_test_signal()` waveform-verification path.
        let test_frame = cli::build_test_frame(pattern).map_err(|e| eyre!("{e}"))?;

        println!("Sending test signal at {} Hz @ {bps} bps", cli.carrier_freq);
        while !abort.load(Ordering::SeqCst) {
            let queue = FrameQueue::new(vec![test_frame; 1024]);
            transmit::transmit(queue, &config, &abort);
        }
        return Ok(());
    }

    if let Some(path) = &cli.input_file {
        println!("Sending file at {} Hz @ {bps} bps", cli.carrier_freq);
        let mut file = std::fs::File::open(path)?;
        let mut buf = vec![0u8; CHUNK_LEN];
        while !abort.load(Ordering::SeqCst) {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            let queue = encoding.encode(&buf[..n]).map_err(|e| eyre!("{e}"))?;
            transmit::transmit(queue, &config, &abort);
        }
        return Ok(());
    }

    println!("Sending input at {} Hz @ {bps} bps", cli.carrier_freq);
    let stdin = std::io::stdin();
    let mut line = String::new();
    while !abort.load(Ordering::SeqCst) {
        line.clear();
        let n = stdin.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        let queue = encoding.encode(line.as_bytes()).map_err(|e| eyre!("{e}"))?;
        transmit::transmit(queue, &config, &abort);
    }

    Ok(())
}
