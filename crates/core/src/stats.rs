//! Small descriptive statistics helpers shared by the scorers.

/// Arithmetic mean (0 for an empty slice).
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (0 for fewer than two values).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Coefficient of variation `std / |mean|`.
///
/// Returns 0 when the mean is (near) zero, so degenerate inputs read as uniform.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.abs() < 1e-12 {
        return 0.0;
    }
    std_dev(values) / m.abs()
}

/// Largest relative deviation from the mean, `max |v - mean| / |mean|`.
pub fn max_relative_deviation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.abs() < 1e-12 {
        return 0.0;
    }
    values
        .iter()
        .map(|v| (v - m).abs() / m.abs())
        .fold(0.0, f64::max)
}

/// `100 * (1 - max relative deviation)`, clamped to [0, 100].
pub fn balance_score(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 100.0;
    }
    (100.0 * (1.0 - max_relative_deviation(values))).clamp(0.0, 100.0)
}

/// Ratio of the smaller to the larger value in [0, 1]; 1 when both are zero.
pub fn min_max_ratio(a: f64, b: f64) -> f64 {
    let hi = a.abs().max(b.abs());
    if hi < 1e-12 {
        return 1.0;
    }
    a.abs().min(b.abs()) / hi
}

/// Clamps a score into [0, 100], mapping NaN to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_cv() {
        assert_eq!(mean(&[]), 0.0);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_relative_eq!(variance(&[1.0, 3.0]), 1.0);
        assert_relative_eq!(coefficient_of_variation(&[1.0, 3.0]), 0.5);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_balance_score() {
        assert_relative_eq!(balance_score(&[10.0, 10.0, 10.0]), 100.0);
        assert_relative_eq!(balance_score(&[5.0, 15.0]), 50.0);
        assert_relative_eq!(balance_score(&[42.0]), 100.0);
        assert_eq!(balance_score(&[0.0, 100.0]), 0.0);
    }

    #[test]
    fn test_min_max_ratio() {
        assert_relative_eq!(min_max_ratio(2.0, 8.0), 0.25);
        assert_relative_eq!(min_max_ratio(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(120.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
    }
}
