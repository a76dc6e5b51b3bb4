mod cli;
mod hid;
mod sampler;
mod signals;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use loadwave_core::logging;

use cli::{Cli, LOAD_REPORT_ID};
use sampler::SamplerConfig;

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init_logger();
    let cli = Cli::parse();

    if cli.rate_hz == 0 {
        return Err(eyre!("sample rate must be > 0 Hz"));
    }

    let stop = Arc::new(AtomicBool::new(false));
    signals::install(stop.clone());

    run_sampler(&cli, &stop)
}

#[cfg(target_os = "linux")]
fn run_sampler(cli: &Cli, stop: &Arc<AtomicBool>) -> Result<()> {
    let mut source = hid::LinuxHidDevice::open(&cli.hiddev_path, LOAD_REPORT_ID)
        .map_err(|e| eyre!("failed to open {}: {e}", cli.hiddev_path))?;

    let config = SamplerConfig {
        rate_hz: cli.rate_hz,
        binary: cli.binary,
        runtime: resolve_runtime(cli.runtime_secs),
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    sampler::run(&mut source, &config, stop, &mut handle)?;

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run_sampler(cli: &Cli, _stop: &Arc<AtomicBool>) -> Result<()> {
    Err(eyre!(
        "hiddev sampling is only implemented on Linux; {} cannot be opened on this platform",
        cli.hiddev_path
    ))
}

/// `-t 0` means "forever" (spec.md §6: "0 means forever"), same as
/// omitting `-t` entirely — matches `apc_ups_logger.c`'s own
/// `if (runtime != 0) { endtime = ...; }` guard.
fn resolve_runtime(runtime_secs: Option<u64>) -> Option<Duration> {
    runtime_secs.filter(|&secs| secs != 0).map(Duration::from_secs)
}
