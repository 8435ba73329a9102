//! Shared fixtures for concordx tests.

use std::fs;
use std::path::{Path, PathBuf};

use concordx_common::{FeatureRecord, FeatureTable, Observation};

pub use pretty_assertions;
pub use tempfile::TempDir;

pub const EFFECT_COLUMN: &str = "avg_log2FC";
pub const SIGNIFICANCE_COLUMN: &str = "p_val_adj";

/// Builds an in-memory `FeatureTable` with columns `[avg_log2FC, p_val_adj]`.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    label: String,
    key_column: String,
    records: Vec<FeatureRecord>,
}

impl TableBuilder {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            key_column: "gene".to_string(),
            records: Vec::new(),
        }
    }

    pub fn key_column(mut self, name: &str) -> Self {
        self.key_column = name.to_string();
        self
    }

    pub fn row(mut self, key: &str, effect: f64, significance: f64) -> Self {
        self.records.push(FeatureRecord {
            key: key.to_string(),
            observation: Observation::new(effect, significance),
            values: vec![effect.to_string(), significance.to_string()],
        });
        self
    }

    pub fn build(self) -> FeatureTable {
        let mut table = FeatureTable::new(
            self.label,
            self.key_column,
            vec![EFFECT_COLUMN.to_string(), SIGNIFICANCE_COLUMN.to_string()],
        );
        table.records = self.records;
        table
    }
}

/// The two three-feature tables used throughout the docs:
/// A is concordant, B is discordant and C has zero effect in both.
pub fn example_tables() -> (FeatureTable, FeatureTable) {
    let comp1 = TableBuilder::new("comp1")
        .row("A", 2.0, 0.01)
        .row("B", -1.0, 0.2)
        .row("C", 0.0, 0.5)
        .build();
    let comp2 = TableBuilder::new("comp2")
        .row("A", 1.8, 0.02)
        .row("B", 1.0, 0.3)
        .row("C", 0.0, 0.9)
        .build();
    (comp1, comp2)
}

/// Write a tab-separated file into `dir` and return its path.
pub fn write_tsv(dir: &Path, name: &str, header: &[&str], rows: &[Vec<&str>]) -> PathBuf {
    let mut content = header.join("\t");
    content.push('\n');
    for row in rows {
        content.push_str(&row.join("\t"));
        content.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, content).expect("write TSV fixture");
    path
}

/// Write arbitrary text (e.g. a GTF fixture) into `dir`.
pub fn write_text(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write text fixture");
    path
}

/// Assert two floats agree within an absolute tolerance.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} ± {tol}, got {actual}"
    );
}
