// WAV source - replays 16-bit PCM recordings through the sampler

use std::path::Path;

use super::source::AnalogSource;
use crate::error::SamplerError;

/// Analog source backed by a decoded WAV file
///
/// Only 16-bit integer PCM is accepted. Multi-channel files are reduced to
/// their first channel.
pub struct WavSource {
    samples: Vec<i16>,
    sample_rate: u32,
    position: usize,
    looping: bool,
}

impl WavSource {
    /// Decode a WAV file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SamplerError> {
        let reader = hound::WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(SamplerError::UnsupportedFormat {
                details: format!(
                    "{:?} {}-bit in {}",
                    spec.sample_format,
                    spec.bits_per_sample,
                    path.as_ref().display()
                ),
            });
        }

        let channels = spec.channels.max(1) as usize;
        let interleaved = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()?;
        let samples = interleaved.into_iter().step_by(channels).collect();

        log::info!(
            "[WavSource] Loaded {} ({} Hz, {} channel(s))",
            path.as_ref().display(),
            spec.sample_rate,
            spec.channels
        );

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    /// Wrap already-decoded mono samples
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            position: 0,
            looping: false,
        }
    }

    /// Restart from the beginning when the end is reached
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AnalogSource for WavSource {
    fn read_sample(&mut self) -> Result<i16, SamplerError> {
        if self.position >= self.samples.len() {
            if !self.looping || self.samples.is_empty() {
                return Err(SamplerError::SourceExhausted);
            }
            self.position = 0;
        }
        let sample = self.samples[self.position];
        self.position += 1;
        Ok(sample)
    }
}
