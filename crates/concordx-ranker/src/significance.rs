//! Empirical one-sided significance against the permutation null.

use concordx_common::{ConcordError, Direction, Result};

use crate::permutation::NullMatrix;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Significance {
    /// Null scores strictly greater than the real score.
    pub exceed: usize,
    pub p_value: f64,
    pub direction: Direction,
}

/// Label a fraction of exceeding null scores.
///
/// `frac < 0.5` is "high" with p = frac; anything else, including exactly
/// 0.5, is "low" with p = 1 − frac. p is therefore always in [0, 0.5].
pub fn classify(frac: f64) -> (Direction, f64) {
    if frac < 0.5 {
        (Direction::High, frac)
    } else {
        (Direction::Low, 1.0 - frac)
    }
}

/// Significance of one real score given its null column.
pub fn empirical_significance(real: f64, null: impl IntoIterator<Item = f64>) -> Significance {
    let mut tally = Tally::default();
    for s in null {
        tally.add(s, real);
    }
    tally.finish()
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    draws: usize,
    exceed: usize,
    ties: usize,
}

impl Tally {
    fn add(&mut self, null: f64, real: f64) {
        self.draws += 1;
        if null > real {
            self.exceed += 1;
        } else if null == real {
            self.ties += 1;
        }
    }

    /// A column where every null score equals the real score carries no
    /// evidence either way and is reported as p = 0.5, "low".
    fn finish(self) -> Significance {
        if self.draws > 0 && self.ties == self.draws {
            return Significance {
                exceed: 0,
                p_value: 0.5,
                direction: Direction::Low,
            };
        }
        let frac = self.exceed as f64 / self.draws as f64;
        let (direction, p_value) = classify(frac);
        Significance {
            exceed: self.exceed,
            p_value,
            direction,
        }
    }
}

/// Significance for every feature. Column i of `null` is tested against
/// `real_scores[i]`; the denominator is the full draw count k.
pub fn compute_significance(real_scores: &[f64], null: &NullMatrix) -> Result<Vec<Significance>> {
    if null.features() != real_scores.len() {
        return Err(ConcordError::Other(anyhow::anyhow!(
            "null matrix has {} columns but {} real scores were given",
            null.features(),
            real_scores.len()
        )));
    }
    if real_scores.is_empty() {
        return Ok(Vec::new());
    }
    if null.draws() == 0 {
        return Err(ConcordError::Other(anyhow::anyhow!(
            "null matrix has no draws for {} features",
            real_scores.len()
        )));
    }

    // Walk rows rather than columns: the matrix is row-major.
    let mut tallies = vec![Tally::default(); real_scores.len()];
    for row in null.rows() {
        for ((tally, &s), &real) in tallies.iter_mut().zip(row).zip(real_scores) {
            tally.add(s, real);
        }
    }

    Ok(tallies.into_iter().map(Tally::finish).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_high_tail() {
        assert_eq!(classify(0.0), (Direction::High, 0.0));
        assert_eq!(classify(0.25), (Direction::High, 0.25));
    }

    #[test]
    fn test_classify_low_tail() {
        let (direction, p) = classify(0.9);
        assert_eq!(direction, Direction::Low);
        assert!((p - 0.1).abs() < 1e-12);
        assert_eq!(classify(1.0), (Direction::Low, 0.0));
    }

    #[test]
    fn test_classify_half_is_low() {
        assert_eq!(classify(0.5), (Direction::Low, 0.5));
    }

    #[test]
    fn test_all_tied_is_low_half() {
        let sig = empirical_significance(1.5, vec![1.5; 16]);
        assert_eq!(sig.exceed, 0);
        assert_eq!(sig.direction, Direction::Low);
        assert_eq!(sig.p_value, 0.5);
    }

    #[test]
    fn test_partial_ties_do_not_count_as_exceeding() {
        let sig = empirical_significance(1.0, vec![1.0, 1.0, 0.5, 0.2]);
        assert_eq!(sig.exceed, 0);
        assert_eq!(sig.direction, Direction::High);
        assert_eq!(sig.p_value, 0.0);
    }

    #[test]
    fn test_exact_half_exceeding_is_low() {
        let sig = empirical_significance(0.0, vec![1.0, 1.0, -1.0, -1.0]);
        assert_eq!(sig.exceed, 2);
        assert_eq!(sig.direction, Direction::Low);
        assert_eq!(sig.p_value, 0.5);
    }

    #[test]
    fn test_strictly_greater_only() {
        let sig = empirical_significance(2.0, vec![2.0, 3.0, 1.0, 0.0]);
        assert_eq!(sig.exceed, 1);
        assert_eq!(sig.direction, Direction::High);
        assert_eq!(sig.p_value, 0.25);
    }

    #[test]
    fn test_p_value_always_at_most_half() {
        for exceed in 0..=20 {
            let null: Vec<f64> = (0..20).map(|i| if i < exceed { 2.0 } else { 0.0 }).collect();
            let sig = empirical_significance(1.0, null);
            assert_eq!(sig.exceed, exceed);
            assert!((0.0..=0.5).contains(&sig.p_value), "p = {}", sig.p_value);
        }
    }
}
