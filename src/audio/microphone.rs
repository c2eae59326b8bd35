// Microphone source - live capture from the default desktop input device
//
// The cpal callback runs on the audio thread and pushes converted samples
// into a lock-free SPSC ring buffer; the sampler pops them on the duty-cycle
// thread. Samples that arrive while the ring is full are dropped, which is
// fine between windows because the ring is drained before each window.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};
use std::time::{Duration, Instant};

use super::source::AnalogSource;
use crate::error::SamplerError;

/// How long `read_sample` waits for the audio thread before giving up
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Live input device as an analog source
pub struct MicrophoneSource {
    /// Kept alive for as long as samples are needed
    _stream: cpal::Stream,
    consumer: Consumer<i16>,
}

impl MicrophoneSource {
    /// Open the default input device at `sample_rate` Hz
    pub fn open(sample_rate: u32) -> Result<Self, SamplerError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| SamplerError::SourceUnavailable {
                reason: "No default input device found".to_string(),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| SamplerError::SourceUnavailable {
                reason: format!("Failed to get default input config: {:?}", e),
            })?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(SamplerError::UnsupportedFormat {
                details: "Only F32 input devices are supported".to_string(),
            });
        }

        let stream_config = cpal::StreamConfig {
            channels: config.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let channels_count = stream_config.channels.max(1) as usize;

        // One second of headroom
        let (mut producer, consumer) = RingBuffer::<i16>::new(sample_rate as usize);

        let err_fn = |err| log::error!("[MicrophoneSource] Input stream error: {}", err);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // De-interleave: take first channel
                    for frame in data.chunks(channels_count) {
                        let sample = frame.first().copied().unwrap_or(0.0);
                        let _ = producer.push(to_i16(sample));
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| SamplerError::SourceUnavailable {
                reason: format!("{:?}", e),
            })?;

        stream.play().map_err(|e| SamplerError::SourceUnavailable {
            reason: format!("{:?}", e),
        })?;

        log::info!(
            "[MicrophoneSource] Capturing at {} Hz from {} channel(s)",
            sample_rate,
            channels_count
        );

        Ok(Self {
            _stream: stream,
            consumer,
        })
    }
}

impl AnalogSource for MicrophoneSource {
    fn read_sample(&mut self) -> Result<i16, SamplerError> {
        let started = Instant::now();
        loop {
            if let Ok(sample) = self.consumer.pop() {
                return Ok(sample);
            }
            if started.elapsed() > READ_TIMEOUT {
                return Err(SamplerError::SourceTimeout {
                    waited_ms: READ_TIMEOUT.as_millis() as u64,
                });
            }
            std::thread::yield_now();
        }
    }

    fn is_self_paced(&self) -> bool {
        true
    }

    // Discard everything captured since the last window
    fn start_window(&mut self) {
        while self.consumer.pop().is_ok() {}
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_to_i16_conversion_clamps() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-2.0), -i16::MAX);
    }
}
