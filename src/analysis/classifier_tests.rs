use super::*;

/// Helper to create a two-feature model with an easy decision boundary
///
/// scaled_0 = ln(1 + x0), scaled_1 = (ln(1 + x1) - 1) / 2
/// score = -1 + 2 * scaled_0 - 1 * scaled_1
fn create_classifier() -> LinearClassifier {
    LinearClassifier::new(ModelParameters {
        n_features: 2,
        intercept: -1.0,
        coefficients: vec![2.0, -1.0],
        means: vec![0.0, 1.0],
        std_devs: vec![1.0, 2.0],
    })
    .unwrap()
}

/// x such that ln(1 + x) == y
fn inv_log1p(y: f32) -> f32 {
    y.exp_m1()
}

#[test]
fn test_decision_function_matches_hand_computation() {
    let classifier = create_classifier();

    // scaled_0 = 1, scaled_1 = (3 - 1) / 2 = 1 -> -1 + 2 - 1 = 0
    let features = [inv_log1p(1.0), inv_log1p(3.0)];
    let score = classifier.decision_function(&features).unwrap();
    assert!(score.abs() < 1e-5, "expected score near 0, got {}", score);
}

#[test]
fn test_predict_positive_class() {
    let classifier = create_classifier();

    // scaled_0 = 2, scaled_1 = 0 -> -1 + 4 - 0 = 3
    let features = [inv_log1p(2.0), inv_log1p(1.0)];
    assert_eq!(classifier.predict(&features), Ok(true));
}

#[test]
fn test_predict_negative_class() {
    let classifier = create_classifier();

    // scaled_0 = 0, scaled_1 = 0 -> -1
    let features = [0.0, inv_log1p(1.0)];
    assert_eq!(classifier.predict(&features), Ok(false));
}

#[test]
fn test_zero_score_is_negative() {
    // Intercept only: score == 0 exactly is not strictly greater than 0
    let classifier = LinearClassifier::new(ModelParameters {
        n_features: 1,
        intercept: 0.0,
        coefficients: vec![0.0],
        means: vec![0.0],
        std_devs: vec![1.0],
    })
    .unwrap();
    assert_eq!(classifier.predict(&[5.0]), Ok(false));
}

#[test]
fn test_predict_is_deterministic() {
    let classifier = LinearClassifier::new(ModelParameters::builtin().unwrap()).unwrap();
    let features: Vec<f32> = (0..8).map(|i| 1_000.0 * (i as f32 + 1.5)).collect();

    let first = classifier.predict(&features).unwrap();
    for _ in 0..100 {
        assert_eq!(classifier.predict(&features).unwrap(), first);
    }
}

#[test]
fn test_wrong_feature_count_is_rejected() {
    let classifier = create_classifier();
    assert_eq!(
        classifier.predict(&[1.0, 2.0, 3.0]),
        Err(AnalysisError::FeatureCountMismatch {
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn test_negative_feature_is_flagged() {
    let classifier = create_classifier();

    // ln(1 + -2) is NaN: unchecked evaluation would compare false silently
    let features = [-2.0, 1.0];
    assert!(classifier.raw_score(&features).is_nan());
    assert_eq!(
        classifier.predict(&features),
        Err(AnalysisError::InvalidFeature {
            index: 0,
            value: -2.0
        })
    );
}

#[test]
fn test_non_finite_feature_is_flagged() {
    let classifier = create_classifier();
    assert!(matches!(
        classifier.predict(&[1.0, f32::NAN]),
        Err(AnalysisError::InvalidFeature { index: 1, .. })
    ));
    assert!(matches!(
        classifier.predict(&[f32::INFINITY, 1.0]),
        Err(AnalysisError::InvalidFeature { index: 0, .. })
    ));
}

#[test]
fn test_invalid_input_defaults_to_negative_class() {
    // Even a model biased strongly positive reports negative on bad input
    let classifier = LinearClassifier::new(ModelParameters {
        n_features: 1,
        intercept: 100.0,
        coefficients: vec![1.0],
        means: vec![0.0],
        std_devs: vec![1.0],
    })
    .unwrap();

    assert!(classifier.predict_or_negative(&[0.0]));
    assert!(!classifier.predict_or_negative(&[-3.0]));
    assert!(!classifier.predict_or_negative(&[]));
}

#[test]
fn test_rejects_invalid_model() {
    let result = LinearClassifier::new(ModelParameters {
        n_features: 2,
        intercept: 0.0,
        coefficients: vec![1.0],
        means: vec![0.0, 0.0],
        std_devs: vec![1.0, 1.0],
    });
    assert!(matches!(result, Err(AnalysisError::InvalidModel { .. })));
}
