//! End-to-end concordance run.
//!
//! align → real scores → drop zero scores → permutation null → significance
//! → assemble. Each run owns all its intermediate data; nothing is shared
//! between runs.

use std::collections::HashSet;

use concordx_common::{Direction, FeatureTable, Result, ResultTable};
use concordx_config::RunConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aligner::align;
use crate::assembler::{assemble, Suffixes};
use crate::permutation::{DrawTask, PermutationEngine, SeedStrategy};
use crate::scorer::score_vector;
use crate::significance::compute_significance;

/// Counts describing one run, for logging and the JSON summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcordanceStats {
    pub comp1_rows: usize,
    pub comp2_rows: usize,
    pub aligned: usize,
    pub zero_score: usize,
    pub surviving: usize,
    pub draws: usize,
    pub workers: usize,
    pub seeds: SeedStrategy,
    pub high: usize,
    pub low: usize,
}

#[derive(Debug, Clone)]
pub struct ConcordanceOutcome {
    pub table: ResultTable,
    pub stats: ConcordanceStats,
}

/// Run the full computation with the standard shuffle draw.
pub fn run_concordance(
    comp1: FeatureTable,
    comp2: FeatureTable,
    config: &RunConfig,
    coding_genes: &HashSet<String>,
) -> Result<ConcordanceOutcome> {
    let engine = PermutationEngine::from_config(&config.permutation)?;
    run_concordance_with(&engine, comp1, comp2, config, coding_genes)
}

/// Run the full computation on a caller-supplied engine.
pub fn run_concordance_with<T: DrawTask>(
    engine: &PermutationEngine<T>,
    comp1: FeatureTable,
    comp2: FeatureTable,
    config: &RunConfig,
    coding_genes: &HashSet<String>,
) -> Result<ConcordanceOutcome> {
    let (comp1_rows, comp2_rows) = (comp1.len(), comp2.len());

    let pair = align(comp1, comp2)?;
    let aligned = pair.len();

    let scores = score_vector(pair.comp1().observations(), pair.comp2().observations());
    let keep: Vec<bool> = scores.iter().map(|s| *s != 0.0).collect();
    let scores: Vec<f64> = scores.into_iter().filter(|s| *s != 0.0).collect();
    let pair = pair.retain(&keep);
    let zero_score = aligned - pair.len();

    info!(aligned, zero_score, surviving = pair.len(), "Scored aligned features");

    let null = engine.run(pair.comp1().observations(), pair.comp2().observations())?;
    let significance = compute_significance(&scores, &null)?;

    let suffixes = Suffixes {
        comp1: config.output.comp1_suffix.clone(),
        comp2: config.output.comp2_suffix.clone(),
    };
    let table = assemble(&pair, &scores, &significance, config.mode, coding_genes, &suffixes)?;

    let high = significance
        .iter()
        .filter(|s| s.direction == Direction::High)
        .count();

    let stats = ConcordanceStats {
        comp1_rows,
        comp2_rows,
        aligned,
        zero_score,
        surviving: table.len(),
        draws: null.draws(),
        workers: engine.workers(),
        seeds: engine.seed_strategy(),
        high,
        low: significance.len() - high,
    };

    info!(
        features = stats.surviving,
        draws = stats.draws,
        high = stats.high,
        low = stats.low,
        "Concordance run complete"
    );

    Ok(ConcordanceOutcome { table, stats })
}
