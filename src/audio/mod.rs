// Audio module - analog sources and the window sampler

pub mod sampler;
pub mod source;
pub mod wav;

#[cfg(feature = "microphone")]
pub mod microphone;

// Re-export commonly used types for convenience
pub use sampler::Sampler;
pub use source::{AnalogSource, SyntheticSource, Waveform};
pub use wav::WavSource;

#[cfg(feature = "microphone")]
pub use microphone::MicrophoneSource;

use crate::config::SamplingConfig;
use crate::error::SamplerError;

/// Open the live input for this build
///
/// With the `microphone` feature this is the default desktop input device;
/// otherwise a 440 Hz synthetic tone stands in for it.
pub fn default_source(sampling: &SamplingConfig) -> Result<Box<dyn AnalogSource>, SamplerError> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "microphone")] {
            Ok(Box::new(MicrophoneSource::open(sampling.sample_rate_hz)?))
        } else {
            log::warn!("[Audio] Built without microphone support, using a synthetic tone");
            Ok(Box::new(SyntheticSource::new(
                sampling.sample_rate_hz,
                Waveform::Sine {
                    frequency_hz: 440.0,
                    amplitude: 8_000,
                },
            )))
        }
    }
}
