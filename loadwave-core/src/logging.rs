//! Logging bootstrap shared by the transmitter and receiver binaries.
//!
//! Both `loadwave-tx` and `loadwave-rx` are single-shot CLI tools that run
//! unattended; `env_logger` reading `RUST_LOG` is enough surface without
//! pulling in a structured-logging stack the rest of this crate has no use
//! for. The timer thread's tick handler never calls through here — see
//! `modulator` — only startup/teardown and the main pacing loop log.

use log::{debug, error, info, log_enabled, warn, Level};

/// Initializes the process-wide logger from the `RUST_LOG` environment
/// variable, defaulting to `info` when unset.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}
