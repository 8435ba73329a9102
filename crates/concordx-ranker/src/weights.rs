//! Significance weighting for the concordance magnitude.

/// Adjusted p-values below this get full weight.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Weight of an effect given its adjusted p-value.
///
/// 1.0 below the threshold, otherwise `log10(s) / log10(0.05)`: exactly 1.0 at
/// the threshold and decaying to 0.0 at `s = 1`.
pub fn significance_weight(significance: f64) -> f64 {
    if significance < SIGNIFICANCE_THRESHOLD {
        1.0
    } else {
        significance.log10() / SIGNIFICANCE_THRESHOLD.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_is_one_at_threshold() {
        assert_eq!(significance_weight(0.05), 1.0);
    }

    #[test]
    fn test_weight_is_one_below_threshold() {
        assert_eq!(significance_weight(0.0), 1.0);
        assert_eq!(significance_weight(1e-300), 1.0);
        assert_eq!(significance_weight(0.049), 1.0);
    }

    #[test]
    fn test_weight_is_zero_at_one() {
        assert_eq!(significance_weight(1.0), 0.0);
    }

    #[test]
    fn test_weight_non_increasing_above_threshold() {
        let mut prev = significance_weight(0.05);
        let mut s = 0.05;
        while s <= 1.0 {
            let w = significance_weight(s);
            assert!(w <= prev, "weight increased at s={s}: {w} > {prev}");
            assert!((0.0..=1.0).contains(&w));
            prev = w;
            s += 0.005;
        }
    }

    #[test]
    fn test_weight_log_interpolation() {
        // log10(0.5) / log10(0.05) ≈ 0.2314
        assert!((significance_weight(0.5) - 0.231_378_3).abs() < 1e-6);
    }
}
