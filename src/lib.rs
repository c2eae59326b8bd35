// Audio Logger Core - duty-cycled acoustic classification logger
// Sample a window, derive features, classify, append one record, sleep

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod device;
pub mod error;
pub mod platform;
pub mod storage;

// Re-exports for convenience
pub use config::DeviceConfig;
pub use device::{Device, DeviceState};

use tracing::Level;

/// Initialize logging
///
/// `debug` mirrors the device's debug flag: diagnostic output is verbose when
/// set and limited to warnings otherwise. Output goes to stderr so CLI
/// results on stdout stay machine-readable. Safe to call more than once.
pub fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    // A second init (tests, repeated CLI runs in-process) is not an error
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(true);
        init_logging(false);
        tracing::info!("logging initialised twice");
    }
}
