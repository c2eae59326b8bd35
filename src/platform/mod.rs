//! Platform collaborators: the monotonic timer and the status LED.
//!
//! The duty cycle only talks to hardware through these traits, so the whole
//! pipeline can run against a virtual clock in tests and offline tools.

use std::thread;
use std::time::{Duration, Instant};

/// Waits shorter than this are spun instead of slept.
const SPIN_THRESHOLD: Duration = Duration::from_millis(2);

/// Monotonic clock measured from boot
pub trait Timer {
    /// Time elapsed since boot
    fn now(&self) -> Duration;

    /// Block for `duration`
    fn delay(&mut self, duration: Duration);

    /// Milliseconds since boot
    fn millis(&self) -> u64 {
        self.now().as_millis() as u64
    }

    /// Block until `deadline` (measured from boot). Returns immediately if
    /// the deadline already passed.
    fn delay_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            self.delay(deadline - now);
        }
    }
}

/// Wall-clock timer backed by `Instant`
pub struct SystemTimer {
    boot: Instant,
}

impl SystemTimer {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SystemTimer {
    fn now(&self) -> Duration {
        self.boot.elapsed()
    }

    fn delay(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        // Sleep coarsely, then spin the remainder for sample-rate accuracy
        if duration > SPIN_THRESHOLD {
            thread::sleep(duration - SPIN_THRESHOLD);
        }
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

/// Virtual clock that only advances when someone waits on it
#[derive(Debug, Default, Clone)]
pub struct ManualTimer {
    now: Duration,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without a delay call
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> Duration {
        self.now
    }

    fn delay(&mut self, duration: Duration) {
        self.now += duration;
    }
}

/// A single on/off indicator
pub trait StatusLed {
    fn set(&mut self, on: bool);
}

/// Host stand-in for the built-in LED: every change is a log line
#[derive(Debug, Default)]
pub struct LogLed {
    on: bool,
}

impl LogLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl StatusLed for LogLed {
    fn set(&mut self, on: bool) {
        self.on = on;
        tracing::trace!(led = if on { "HIGH" } else { "LOW" }, "status LED");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_timer_advances_only_on_delay() {
        let mut timer = ManualTimer::new();
        assert_eq!(timer.millis(), 0);

        timer.delay(Duration::from_millis(250));
        assert_eq!(timer.millis(), 250);

        timer.advance(Duration::from_micros(500));
        assert_eq!(timer.now(), Duration::from_micros(250_500));
    }

    #[test]
    fn test_delay_until_past_deadline_is_noop() {
        let mut timer = ManualTimer::new();
        timer.advance(Duration::from_secs(2));
        timer.delay_until(Duration::from_secs(1));
        assert_eq!(timer.now(), Duration::from_secs(2));

        timer.delay_until(Duration::from_secs(3));
        assert_eq!(timer.now(), Duration::from_secs(3));
    }

    #[test]
    fn test_system_timer_waits_at_least_requested() {
        let mut timer = SystemTimer::new();
        let before = timer.now();
        timer.delay(Duration::from_millis(3));
        assert!(timer.now() - before >= Duration::from_millis(3));
    }

    #[test]
    fn test_log_led_tracks_state() {
        let mut led = LogLed::new();
        assert!(!led.is_on());
        led.set(true);
        assert!(led.is_on());
    }
}
