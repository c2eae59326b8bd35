// Stats module - summary statistics over a raw sample window
//
// Count, mean, bias-corrected standard deviation (divisor n - 1), min and max.
// At least two samples are required.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Initial min bound used by older device firmware
pub const LEGACY_MIN_SENTINEL: i16 = 10_000;

/// Initial max bound used by older device firmware
pub const LEGACY_MAX_SENTINEL: i16 = 0;

/// How min/max are seeded before the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsInit {
    /// Seed from the first sample (correct for any input)
    #[default]
    FirstSample,
    /// Seed with 10000/0 like older device logs. Minimums above 10000 and
    /// negative maximums are reported as the sentinel instead.
    LegacySentinel,
}

impl BoundsInit {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            BoundsInit::LegacySentinel
        } else {
            BoundsInit::FirstSample
        }
    }
}

/// Summary statistics record for one window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub n_samples: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: i16,
    pub max: i16,
}

impl SummaryStats {
    /// Compute statistics over `samples`
    ///
    /// # Errors
    /// `InsufficientSamples` when fewer than 2 samples are given
    pub fn compute(samples: &[i16], bounds: BoundsInit) -> Result<Self, AnalysisError> {
        let n = samples.len();
        if n < 2 {
            return Err(AnalysisError::InsufficientSamples {
                required: 2,
                collected: n,
            });
        }

        let (mut min, mut max) = match bounds {
            BoundsInit::FirstSample => (samples[0], samples[0]),
            BoundsInit::LegacySentinel => (LEGACY_MIN_SENTINEL, LEGACY_MAX_SENTINEL),
        };

        let mut sum = 0.0f64;
        for &sample in samples {
            sum += sample as f64;
            min = min.min(sample);
            max = max.max(sample);
        }
        let mean = sum / n as f64;

        let diff_sq_sum: f64 = samples
            .iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum();

        Ok(Self {
            n_samples: n,
            mean: mean as f32,
            std_dev: (diff_sq_sum / (n - 1) as f64).sqrt() as f32,
            min,
            max,
        })
    }

    /// Recompute in place
    ///
    /// Returns `false` and leaves the record untouched when there are fewer
    /// than 2 samples.
    pub fn update(&mut self, samples: &[i16], bounds: BoundsInit) -> bool {
        match Self::compute(samples, bounds) {
            Ok(stats) => {
                *self = stats;
                true
            }
            Err(_) => false,
        }
    }
}
