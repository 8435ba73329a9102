//! Concordance score computation.
//!
//! score = magnitude × ratio, where
//!   magnitude = |e1·w(s1)| + |e2·w(s2)|
//!   ratio     = max(|e1|,|e2|) / (|e1−e2| + 1)        if e1·e2 > 0
//!             = −|e1−e2| / (max(|e1|,|e2|) + 1)       otherwise

use concordx_common::Observation;

use crate::weights::significance_weight;

/// Significance-weighted sum of absolute effects across both comparisons.
pub fn magnitude(comp1: Observation, comp2: Observation) -> f64 {
    (comp1.effect * significance_weight(comp1.significance)).abs()
        + (comp2.effect * significance_weight(comp2.significance)).abs()
}

/// Agreement between two effects.
///
/// Positive when the signs agree, shrinking as the effects diverge; never
/// positive when they disagree or either effect is zero.
pub fn directional_ratio(effect1: f64, effect2: f64) -> f64 {
    let larger = effect1.abs().max(effect2.abs());
    let gap = (effect1 - effect2).abs();
    if effect1 * effect2 > 0.0 {
        larger / (gap + 1.0)
    } else {
        -gap / (larger + 1.0)
    }
}

/// Concordance score for one feature.
pub fn concordance_score(comp1: Observation, comp2: Observation) -> f64 {
    magnitude(comp1, comp2) * directional_ratio(comp1.effect, comp2.effect)
}

/// Score every feature of two index-aligned observation vectors.
///
/// Both slices must have the same length; row `i` of each refers to the
/// same feature (or, inside a permutation draw, to a shuffled pairing).
pub fn score_vector(comp1: &[Observation], comp2: &[Observation]) -> Vec<f64> {
    debug_assert_eq!(comp1.len(), comp2.len());
    comp1
        .iter()
        .zip(comp2.iter())
        .map(|(a, b)| concordance_score(*a, *b))
        .collect()
}
