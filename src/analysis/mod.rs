// Analysis module - per-window DSP and classification
//
// Pipeline per duty cycle:
//   Sample window → SummaryStats (window std dev)
//                 → SpectralTransform (magnitudes) → LinearClassifier
//   → one LogRecord for the persistence sink

pub mod classifier;
pub mod model;
pub mod pipeline;
pub mod spectral;
pub mod stats;

pub use classifier::LinearClassifier;
pub use model::ModelParameters;
pub use pipeline::{CycleBuffers, DutyCyclePipeline};
pub use spectral::{SpectralBuffers, SpectralTransform};
pub use stats::{BoundsInit, SummaryStats};
