// Classifier - log-scaled, standardised linear decision function
//
// For each feature i:
//   scaled_i = (ln(1 + x_i) - mean_i) / std_dev_i
// and the window is positive iff
//   intercept + Σ coef_i · scaled_i > 0
//
// This is the logistic regression decision boundary without the sigmoid;
// only the sign matters, so no probability or confidence is exposed.
//
// ln(1 + x) is undefined for x < -1 and NaN compares false, so an unchecked
// evaluation silently falls back to the negative class on bad input. The
// checked entry points reject negative and non-finite features instead.

use crate::analysis::model::ModelParameters;
use crate::error::{log_analysis_error, AnalysisError};

/// Binary linear classifier over log1p-scaled features
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    params: ModelParameters,
}

impl LinearClassifier {
    /// Create a classifier from validated parameters
    ///
    /// # Errors
    /// Returns `InvalidModel` if the parameters are inconsistent
    pub fn new(params: ModelParameters) -> Result<Self, AnalysisError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn n_features(&self) -> usize {
        self.params.n_features
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    /// Signed distance from the decision boundary
    ///
    /// # Errors
    /// * `FeatureCountMismatch` - `features.len()` differs from the model
    /// * `InvalidFeature` - a feature is negative or not finite
    pub fn decision_function(&self, features: &[f32]) -> Result<f32, AnalysisError> {
        if features.len() != self.params.n_features {
            return Err(AnalysisError::FeatureCountMismatch {
                expected: self.params.n_features,
                actual: features.len(),
            });
        }

        if let Some((index, &value)) = features
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(AnalysisError::InvalidFeature { index, value });
        }

        Ok(self.raw_score(features))
    }

    /// Positive class iff the decision function is strictly greater than 0
    pub fn predict(&self, features: &[f32]) -> Result<bool, AnalysisError> {
        Ok(self.decision_function(features)? > 0.0)
    }

    /// Duty-cycle entry point: invalid input is logged and counts as the
    /// negative class
    pub fn predict_or_negative(&self, features: &[f32]) -> bool {
        match self.predict(features) {
            Ok(prediction) => prediction,
            Err(err) => {
                log_analysis_error(&err, "LinearClassifier::predict");
                false
            }
        }
    }

    /// Unchecked evaluation, NaN propagates
    fn raw_score(&self, features: &[f32]) -> f32 {
        let p = &self.params;
        features
            .iter()
            .zip(&p.coefficients)
            .zip(p.means.iter().zip(&p.std_devs))
            .fold(p.intercept, |s, ((&x, &coef), (&mean, &std_dev))| {
                let scaled = (x.ln_1p() - mean) / std_dev;
                s + coef * scaled
            })
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
