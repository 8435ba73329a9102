//! Merge aligned tables, scores and significance into the output table.

use std::collections::HashSet;

use concordx_common::{ConcordError, Mode, ResultRecord, ResultTable, Result};

use crate::aligner::AlignedPair;
use crate::significance::Significance;

/// Suffixes applied to column names present in both comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffixes {
    pub comp1: String,
    pub comp2: String,
}

impl Default for Suffixes {
    fn default() -> Self {
        Self {
            comp1: "_comp1".to_string(),
            comp2: "_comp2".to_string(),
        }
    }
}

/// Output column names for both sides. Only names that occur on both sides
/// get a suffix.
pub fn output_columns(comp1: &[String], comp2: &[String], suffixes: &Suffixes) -> (Vec<String>, Vec<String>) {
    let in1: HashSet<&str> = comp1.iter().map(String::as_str).collect();
    let in2: HashSet<&str> = comp2.iter().map(String::as_str).collect();

    let rename = |cols: &[String], other: &HashSet<&str>, suffix: &str| -> Vec<String> {
        cols.iter()
            .map(|c| {
                if other.contains(c.as_str()) {
                    format!("{c}{suffix}")
                } else {
                    c.clone()
                }
            })
            .collect()
    };

    (rename(comp1, &in2, &suffixes.comp1), rename(comp2, &in1, &suffixes.comp2))
}

/// Build the result table. `pair`, `scores` and `significance` must all
/// describe the same surviving features in the same order.
///
/// In gene mode every row gets `coding = key ∈ coding_genes`.
pub fn assemble(
    pair: &AlignedPair,
    scores: &[f64],
    significance: &[Significance],
    mode: Mode,
    coding_genes: &HashSet<String>,
    suffixes: &Suffixes,
) -> Result<ResultTable> {
    if scores.len() != pair.len() || significance.len() != pair.len() {
        return Err(ConcordError::Other(anyhow::anyhow!(
            "cannot assemble {} features with {} scores and {} p-values",
            pair.len(),
            scores.len(),
            significance.len()
        )));
    }

    let (comp1_columns, comp2_columns) =
        output_columns(pair.comp1().columns(), pair.comp2().columns(), suffixes);

    // Keys are already sorted by the aligner.
    let records = pair
        .keys()
        .iter()
        .enumerate()
        .map(|(i, key)| ResultRecord {
            key: key.clone(),
            comp1_values: pair.comp1().values(i).to_vec(),
            comp2_values: pair.comp2().values(i).to_vec(),
            score: scores[i],
            p_value: significance[i].p_value,
            direction: significance[i].direction,
            coding: match mode {
                Mode::Gene => Some(coding_genes.contains(key)),
                Mode::Pathway => None,
            },
        })
        .collect();

    Ok(ResultTable {
        mode,
        key_column: pair.key_column().to_string(),
        comp1_columns,
        comp2_columns,
        records,
    })
}
