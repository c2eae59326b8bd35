// Duty-cycle pipeline - turns one acquired window into one log record
//
// Buffers are owned by the caller and passed in by reference; nothing here
// keeps state across cycles except the planned FFT and the model.

use super::classifier::LinearClassifier;
use super::model::ModelParameters;
use super::spectral::{SpectralBuffers, SpectralTransform};
use super::stats::{BoundsInit, SummaryStats};
use crate::config::{PipelineConfig, PipelineMode};
use crate::error::AnalysisError;
use crate::storage::LogRecord;

/// Sample window plus spectral scratch, reused every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleBuffers {
    pub window: Vec<i16>,
    pub spectral: SpectralBuffers,
}

impl CycleBuffers {
    pub fn new(window_len: usize, spectral_len: usize) -> Self {
        Self {
            window: vec![0; window_len],
            spectral: SpectralBuffers::new(spectral_len),
        }
    }

    /// Zero everything without reallocating
    pub fn clear(&mut self) {
        self.window.fill(0);
        self.spectral.clear();
    }

    pub fn is_zeroed(&self) -> bool {
        self.window.iter().all(|&s| s == 0) && self.spectral.is_zeroed()
    }
}

struct SpectralStage {
    transform: SpectralTransform,
    classifier: LinearClassifier,
}

/// Per-cycle feature extraction and classification
pub struct DutyCyclePipeline {
    mode: PipelineMode,
    bounds: BoundsInit,
    spectral: Option<SpectralStage>,
}

impl DutyCyclePipeline {
    /// Build the pipeline for `config`
    ///
    /// `model` is required in classify mode and ignored otherwise.
    pub fn new(
        config: &PipelineConfig,
        model: Option<ModelParameters>,
    ) -> Result<Self, AnalysisError> {
        let spectral = match config.mode {
            PipelineMode::Classify => {
                let model = model.ok_or_else(|| AnalysisError::InvalidModel {
                    reason: "classify mode needs model parameters".to_string(),
                })?;
                if model.n_features > config.fft_window_len {
                    return Err(AnalysisError::FeatureCountMismatch {
                        expected: model.n_features,
                        actual: config.fft_window_len,
                    });
                }
                Some(SpectralStage {
                    transform: SpectralTransform::new(config.fft_window_len),
                    classifier: LinearClassifier::new(model)?,
                })
            }
            PipelineMode::Summary | PipelineMode::Capture => None,
        };

        Ok(Self {
            mode: config.mode,
            bounds: BoundsInit::from_legacy_flag(config.legacy_min_max_sentinels),
            spectral,
        })
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    /// Buffers sized for this pipeline
    pub fn allocate_buffers(&self, window_len: usize) -> CycleBuffers {
        let spectral_len = self.spectral.as_ref().map_or(0, |s| s.transform.len());
        CycleBuffers::new(window_len, spectral_len)
    }

    /// Derive the record for the first `samples` entries of the window
    ///
    /// In classify mode the spectral buffers hold magnitudes afterwards; the
    /// caller clears them once the record is persisted.
    pub fn process<'a>(
        &mut self,
        buffers: &'a mut CycleBuffers,
        samples: usize,
        timestamp_ms: u64,
    ) -> Result<LogRecord<'a>, AnalysisError> {
        let window = &buffers.window[..samples.min(buffers.window.len())];

        match (self.mode, self.spectral.as_mut()) {
            (PipelineMode::Classify, Some(stage)) => {
                let stats = SummaryStats::compute(window, self.bounds)?;
                stage
                    .transform
                    .compute_magnitudes(window, &mut buffers.spectral)?;

                let n_features = stage.classifier.n_features();
                let prediction = stage
                    .classifier
                    .predict_or_negative(&buffers.spectral.real[..n_features]);

                tracing::debug!(
                    timestamp_ms,
                    win_std_dev = stats.std_dev,
                    prediction,
                    "classified window"
                );
                Ok(LogRecord::Prediction {
                    timestamp_ms,
                    win_std_dev: stats.std_dev,
                    prediction,
                })
            }
            (PipelineMode::Summary, _) => {
                let stats = SummaryStats::compute(window, self.bounds)?;
                tracing::debug!(
                    timestamp_ms,
                    mean = stats.mean,
                    std_dev = stats.std_dev,
                    "summarised window"
                );
                Ok(LogRecord::Summary {
                    timestamp_ms,
                    stats,
                })
            }
            (PipelineMode::Capture, _) => Ok(LogRecord::Capture {
                timestamp_ms,
                samples: window,
            }),
            (PipelineMode::Classify, None) => Err(AnalysisError::InvalidModel {
                reason: "classifier not initialised".to_string(),
            }),
        }
    }
}
