//! Core record types shared by the loaders, the ranker and the writers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// What the feature keys name. Gene mode adds a protein-coding flag to every
/// output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Gene,
    Pathway,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Gene => "gene",
            Mode::Pathway => "pathway",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gene" => Ok(Mode::Gene),
            "pathway" => Ok(Mode::Pathway),
            other => Err(format!("unknown mode '{other}' (expected gene or pathway)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which tail of the null distribution the real score fell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    High,
    Low,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::High => "high",
            Direction::Low => "low",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Feature tables
// ---------------------------------------------------------------------------

/// One (effect, significance) measurement for a feature in one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Signed effect size, e.g. a log2 fold change.
    pub effect: f64,
    /// Adjusted p-value in [0, 1].
    pub significance: f64,
}

impl Observation {
    pub fn new(effect: f64, significance: f64) -> Self {
        Self {
            effect,
            significance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub key: String,
    pub observation: Observation,
    /// Raw text of every non-key column, in `FeatureTable::columns` order.
    pub values: Vec<String>,
}

/// A loaded comparison table. Rows with missing values have already been
/// dropped; keys are not yet checked for uniqueness.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    /// Short name used in log lines and errors, e.g. "comp1".
    pub label: String,
    pub key_column: String,
    /// Non-key column names in input order.
    pub columns: Vec<String>,
    pub records: Vec<FeatureRecord>,
}

impl FeatureTable {
    pub fn new(label: impl Into<String>, key_column: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            label: label.into(),
            key_column: key_column.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub key: String,
    pub comp1_values: Vec<String>,
    pub comp2_values: Vec<String>,
    pub score: f64,
    pub p_value: f64,
    pub direction: Direction,
    /// Present in gene mode only.
    pub coding: Option<bool>,
}

/// Final merged table, one row per feature with a nonzero score, sorted by key.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub mode: Mode,
    pub key_column: String,
    /// Output names of the comparison-1 columns (suffixed where they collide).
    pub comp1_columns: Vec<String>,
    pub comp2_columns: Vec<String>,
    pub records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full output header in write order.
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.comp1_columns.len() + self.comp2_columns.len() + 5);
        header.push(self.key_column.clone());
        header.extend(self.comp1_columns.iter().cloned());
        header.extend(self.comp2_columns.iter().cloned());
        header.push("score".to_string());
        header.push("p".to_string());
        header.push("convergence".to_string());
        if self.mode == Mode::Gene {
            header.push("coding".to_string());
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_case_insensitive() {
        assert_eq!("Gene".parse::<Mode>().unwrap(), Mode::Gene);
        assert_eq!("PATHWAY".parse::<Mode>().unwrap(), Mode::Pathway);
        assert!("transcript".parse::<Mode>().is_err());
    }

    #[test]
    fn test_result_header_gene_mode_has_coding() {
        let table = ResultTable {
            mode: Mode::Gene,
            key_column: "gene".into(),
            comp1_columns: vec!["avg_log2FC_comp1".into()],
            comp2_columns: vec!["avg_log2FC_comp2".into()],
            records: vec![],
        };
        assert_eq!(
            table.header(),
            vec!["gene", "avg_log2FC_comp1", "avg_log2FC_comp2", "score", "p", "convergence", "coding"]
        );
    }

    #[test]
    fn test_result_header_pathway_mode_has_no_coding() {
        let table = ResultTable {
            mode: Mode::Pathway,
            key_column: "pathway".into(),
            comp1_columns: vec![],
            comp2_columns: vec![],
            records: vec![],
        };
        assert_eq!(table.header().last().map(String::as_str), Some("convergence"));
    }
}
