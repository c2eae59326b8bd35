// Sampler - fills the sample window at a fixed rate
//
// The window is overwritten in place. Sample i is taken at
// `start + i / sample_rate`; timing accuracy is whatever the platform timer
// gives us and is not validated here.

use std::time::Duration;

use super::source::AnalogSource;
use crate::error::SamplerError;
use crate::platform::Timer;

/// Fixed-rate, fixed-duration window acquisition
#[derive(Debug, Clone)]
pub struct Sampler {
    sample_rate: u32,
    duration_ms: u64,
}

impl Sampler {
    /// Create a sampler
    ///
    /// # Arguments
    /// * `sample_rate` - Target rate in Hz
    /// * `duration_ms` - Window length in milliseconds
    pub fn new(sample_rate: u32, duration_ms: u64) -> Self {
        Self {
            sample_rate,
            duration_ms,
        }
    }

    /// Number of samples one window holds (`rate × duration`)
    pub fn window_len(&self) -> usize {
        let samples = (self.sample_rate as u64).saturating_mul(self.duration_ms) / 1_000;
        usize::try_from(samples).unwrap_or(usize::MAX)
    }

    /// Interval between two samples
    pub fn sample_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.sample_rate.max(1) as u64)
    }

    /// Acquire one window
    ///
    /// Writes exactly `window_len()` samples into the front of `window` and
    /// returns that count. The window must be at least that long.
    pub fn acquire<A, T>(
        &self,
        source: &mut A,
        timer: &mut T,
        window: &mut [i16],
    ) -> Result<usize, SamplerError>
    where
        A: AnalogSource + ?Sized,
        T: Timer + ?Sized,
    {
        let count = self.window_len().min(window.len());
        debug_assert_eq!(count, self.window_len(), "sample window too short");

        source.start_window();
        let paced = !source.is_self_paced();
        let start = timer.now();

        for (i, slot) in window[..count].iter_mut().enumerate() {
            if paced {
                let offset = Duration::from_nanos(
                    i as u64 * 1_000_000_000 / self.sample_rate as u64,
                );
                timer.delay_until(start + offset);
            }
            *slot = source.read_sample()?;
        }

        if paced {
            // The window spans the full duration, including the last interval
            timer.delay_until(start + Duration::from_millis(self.duration_ms));
        }

        log::debug!(
            "[Sampler] Acquired {} samples in {:?}",
            count,
            timer.now() - start
        );
        Ok(count)
    }
}
