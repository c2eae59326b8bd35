// Model module - pre-trained logistic regression parameters
//
// The weights are produced offline and embedded at build time. They are
// parsed and validated once at startup, before the first duty cycle.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AnalysisError;

/// Weights compiled into the binary
const BUILTIN_WEIGHTS: &str = include_str!("../../assets/model_weights.json");

/// Scaler statistics and linear coefficients for one binary model
///
/// Each feature is transformed as `(ln(1 + x) - mean) / std_dev` before the
/// dot product with `coefficients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Declared feature count
    pub n_features: usize,
    pub intercept: f32,
    pub coefficients: Vec<f32>,
    /// Per-feature scaler means (of the log1p features)
    pub means: Vec<f32>,
    /// Per-feature scaler standard deviations
    pub std_devs: Vec<f32>,
}

impl ModelParameters {
    /// Parse and validate the embedded weights
    pub fn builtin() -> Result<Self, AnalysisError> {
        Self::from_json(BUILTIN_WEIGHTS)
    }

    /// Parse and validate weights from a JSON string
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Parse and validate weights from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let contents =
            fs::read_to_string(&path).map_err(|err| AnalysisError::ModelParseFailed {
                reason: format!("{}: {}", path.as_ref().display(), err),
            })?;
        Self::from_json(&contents)
    }

    /// Check lengths against the declared feature count and reject zero or
    /// non-finite scaler deviations
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.n_features == 0 {
            return Err(invalid_model("n_features must be greater than 0"));
        }

        for (name, values) in [
            ("coefficients", &self.coefficients),
            ("means", &self.means),
            ("std_devs", &self.std_devs),
        ] {
            if values.len() != self.n_features {
                return Err(invalid_model(&format!(
                    "{} has {} entries, expected {}",
                    name,
                    values.len(),
                    self.n_features
                )));
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(invalid_model(&format!("{}[{}] is not finite", name, index)));
            }
        }

        if let Some(index) = self.std_devs.iter().position(|&s| s == 0.0) {
            return Err(invalid_model(&format!("std_devs[{}] is zero", index)));
        }

        if !self.intercept.is_finite() {
            return Err(invalid_model("intercept is not finite"));
        }

        Ok(())
    }
}

fn invalid_model(reason: &str) -> AnalysisError {
    AnalysisError::InvalidModel {
        reason: reason.to_string(),
    }
}
