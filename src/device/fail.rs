// Fail indicator - the only thing a halted device still does

use std::time::Duration;

use crate::platform::StatusLed;

/// Half-period of the diagnostic blink
pub const TOGGLE_PERIOD: Duration = Duration::from_millis(100);

/// Square-wave driver for the status LED
///
/// Starts LOW. Each `toggle` writes the current level and then flips it, so
/// the first write after a failure is LOW, the next HIGH, and so on.
pub struct FailIndicator<L: StatusLed> {
    led: L,
    level: bool,
    toggles: u64,
}

impl<L: StatusLed> FailIndicator<L> {
    pub fn new(led: L) -> Self {
        Self {
            led,
            level: false,
            toggles: 0,
        }
    }

    pub fn toggle(&mut self) {
        if self.toggles == 0 {
            // The LED itself may only be a trace line on a host; announce once
            tracing::warn!(
                period_ms = TOGGLE_PERIOD.as_millis() as u64,
                "device halted, status LED blinking"
            );
        }
        self.led.set(self.level);
        self.level = !self.level;
        self.toggles += 1;
    }

    /// Number of LED writes so far
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    pub fn led(&self) -> &L {
        &self.led
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingLed {
        writes: Vec<bool>,
    }

    impl StatusLed for RecordingLed {
        fn set(&mut self, on: bool) {
            self.writes.push(on);
        }
    }

    #[test]
    fn test_indicator_alternates_starting_low() {
        let mut indicator = FailIndicator::new(RecordingLed::default());
        for _ in 0..5 {
            indicator.toggle();
        }

        assert_eq!(indicator.led().writes, vec![false, true, false, true, false]);
        assert_eq!(indicator.toggles(), 5);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fail_pattern_is_announced_once_at_warn() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut indicator = FailIndicator::new(RecordingLed::default());
            for _ in 0..3 {
                indicator.toggle();
            }
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("device halted, status LED blinking").count(), 1);
        assert!(output.contains("WARN"));
    }

    #[test]
    fn test_toggle_period() {
        assert_eq!(TOGGLE_PERIOD.as_millis(), 100);
    }
}
