// Analog sources - where the sampler reads amplitude values from
//
// On the device this is the PDM microphone. On a host it is either the
// desktop input device, a WAV file or a deterministic generator.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::PI;

use crate::error::SamplerError;

/// A source of signed 16-bit amplitude samples
pub trait AnalogSource {
    /// Read the next sample
    fn read_sample(&mut self) -> Result<i16, SamplerError>;

    /// True when the source itself delivers samples at the stream rate, so
    /// the sampler must not add its own pacing.
    fn is_self_paced(&self) -> bool {
        false
    }

    /// Called right before a window is acquired
    fn start_window(&mut self) {}
}

impl<S: AnalogSource + ?Sized> AnalogSource for Box<S> {
    fn read_sample(&mut self) -> Result<i16, SamplerError> {
        (**self).read_sample()
    }

    fn is_self_paced(&self) -> bool {
        (**self).is_self_paced()
    }

    fn start_window(&mut self) {
        (**self).start_window()
    }
}

/// Deterministic waveform patterns
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// Every sample has the same value
    Constant(i16),
    /// Pure tone
    Sine { frequency_hz: f32, amplitude: i16 },
    /// Uniform noise in `[-amplitude, amplitude]` from a fixed seed
    WhiteNoise { amplitude: i16, seed: u64 },
}

/// Procedural source used for offline runs and tests
pub struct SyntheticSource {
    sample_rate: u32,
    waveform: Waveform,
    position: u64,
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(sample_rate: u32, waveform: Waveform) -> Self {
        let seed = match waveform {
            Waveform::WhiteNoise { seed, .. } => seed,
            _ => 0,
        };
        Self {
            sample_rate,
            waveform,
            position: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Samples produced so far
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl AnalogSource for SyntheticSource {
    fn read_sample(&mut self) -> Result<i16, SamplerError> {
        let value = match self.waveform {
            Waveform::Constant(value) => value,
            Waveform::Sine {
                frequency_hz,
                amplitude,
            } => {
                // Keep the phase argument small over long runs
                let period = (self.sample_rate as f64 / frequency_hz as f64).max(1.0);
                let t = ((self.position as f64 % period) / self.sample_rate as f64) as f32;
                (amplitude as f32 * (2.0 * PI * frequency_hz * t).sin()).round() as i16
            }
            Waveform::WhiteNoise { amplitude, .. } => {
                let bound = amplitude.unsigned_abs() as i32;
                self.rng.gen_range(-bound..=bound) as i16
            }
        };
        self.position += 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_source() {
        let mut source = SyntheticSource::new(20_000, Waveform::Constant(512));
        for _ in 0..10 {
            assert_eq!(source.read_sample(), Ok(512));
        }
        assert_eq!(source.position(), 10);
        assert!(!source.is_self_paced());
    }

    #[test]
    fn test_sine_source_starts_at_zero_and_stays_bounded() {
        let mut source = SyntheticSource::new(
            8_000,
            Waveform::Sine {
                frequency_hz: 1_000.0,
                amplitude: 1_000,
            },
        );
        assert_eq!(source.read_sample(), Ok(0));
        for _ in 0..1_000 {
            let sample = source.read_sample().unwrap();
            assert!((-1_000..=1_000).contains(&sample));
        }
    }

    #[test]
    fn test_noise_is_seeded() {
        let waveform = Waveform::WhiteNoise {
            amplitude: 300,
            seed: 42,
        };
        let mut a = SyntheticSource::new(20_000, waveform);
        let mut b = SyntheticSource::new(20_000, waveform);
        for _ in 0..100 {
            let sample = a.read_sample().unwrap();
            assert_eq!(Ok(sample), b.read_sample());
            assert!((-300..=300).contains(&sample));
        }
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut source: Box<dyn AnalogSource> =
            Box::new(SyntheticSource::new(20_000, Waveform::Constant(-7)));
        assert_eq!(source.read_sample(), Ok(-7));
        assert!(!source.is_self_paced());
    }
}
