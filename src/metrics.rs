//! Goodness-of-fit metrics for regression.

/// The coefficient of determination: R² = 1 - SS_res / SS_tot.
///
/// 1.0 is a perfect prediction and 0.0 is as good as predicting the mean.
/// When the targets are constant, a perfect prediction scores 1.0 and
/// anything else scores 0.0.
pub fn r2_score(targets: &[f64], predictions: &[f64]) -> f64 {
    assert_eq!(targets.len(), predictions.len(), "Length mismatch");
    if targets.is_empty() {
        return 0.0;
    }

    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let ss_tot: f64 = targets.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[test]
fn test_r2_score() {
    let targets = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(r2_score(&targets, &targets), 1.0);
    assert_eq!(r2_score(&targets, &[2.5, 2.5, 2.5, 2.5]), 0.0);
    // SS_res = 1, SS_tot = 5.
    let r2 = r2_score(&targets, &[1.0, 2.0, 3.0, 5.0]);
    assert!((r2 - 0.8).abs() < 1e-12);
    assert!(r2_score(&targets, &[4.0, 3.0, 2.0, 1.0]) < 0.0);
}

#[test]
fn test_r2_constant_targets() {
    assert_eq!(r2_score(&[3.0, 3.0], &[3.0, 3.0]), 1.0);
    assert_eq!(r2_score(&[3.0, 3.0], &[3.0, 2.0]), 0.0);
    assert_eq!(r2_score(&[], &[]), 0.0);
}
