//! Numeric helpers with zero-denominator guards
//!
//! Every ratio the analyzers compute goes through here so that sparse data
//! resolves to a defined value instead of NaN or infinity.

/// `num / den`, or None when the denominator is zero or the result isn't finite
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}

/// `num / den`, falling back to `default` when the division is undefined
pub fn ratio_or(num: f64, den: f64, default: f64) -> f64 {
    ratio(num, den).unwrap_or(default)
}

/// Percentage change from `previous` to `current`, None when previous is zero
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    ratio(current - previous, previous).map(|r| r * 100.0)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Round to cents for display-facing amounts
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_guards_zero() {
        assert_eq!(ratio(5.0, 0.0), None);
        assert_eq!(ratio_or(5.0, 0.0, -1.0), -1.0);
        assert_eq!(ratio(5.0, 2.0), Some(2.5));
        assert_eq!(ratio(f64::MAX, f64::MIN_POSITIVE), None);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(300.0, 200.0), Some(50.0));
        assert_eq!(percent_change(0.0, 200.0), Some(-100.0));
        assert_eq!(percent_change(10.0, 0.0), None);
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[]), None);
        assert_eq!(mean(&[2.0, 4.0, 6.0]), Some(4.0));
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), Some(0.0));

        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(0.004), 0.0);
    }
}
