//! Key alignment of the two comparison tables.
//!
//! `AlignedPair` can only be built here. Row `i` of both sides always refers
//! to `keys[i]`, and keys are sorted byte-wise ascending.

use std::collections::BTreeMap;

use concordx_common::{ConcordError, FeatureRecord, FeatureTable, Observation, Result};
use tracing::{debug, info};

/// One comparison restricted to the shared keys.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSide {
    label: String,
    columns: Vec<String>,
    observations: Vec<Observation>,
    values: Vec<Vec<String>>,
}

impl AlignedSide {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Non-key column names of the source table.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Raw column text for row `i`.
    pub fn values(&self, i: usize) -> &[String] {
        &self.values[i]
    }

    fn with_capacity(label: String, columns: Vec<String>, n: usize) -> Self {
        Self {
            label,
            columns,
            observations: Vec::with_capacity(n),
            values: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, record: FeatureRecord) {
        self.observations.push(record.observation);
        self.values.push(record.values);
    }
}

/// Two comparisons reduced to their shared keys, in identical order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    key_column: String,
    keys: Vec<String>,
    comp1: AlignedSide,
    comp2: AlignedSide,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn comp1(&self) -> &AlignedSide {
        &self.comp1
    }

    pub fn comp2(&self) -> &AlignedSide {
        &self.comp2
    }

    /// Keep only rows whose mask entry is true. Order is preserved, so the
    /// result is still aligned.
    pub fn retain(self, keep: &[bool]) -> AlignedPair {
        debug_assert_eq!(keep.len(), self.len());
        let n = keep.iter().filter(|k| **k).count();

        let AlignedPair { key_column, keys, comp1, comp2 } = self;
        let mut out = AlignedPair {
            key_column,
            keys: Vec::with_capacity(n),
            comp1: AlignedSide::with_capacity(comp1.label, comp1.columns, n),
            comp2: AlignedSide::with_capacity(comp2.label, comp2.columns, n),
        };

        let rows = keys
            .into_iter()
            .zip(comp1.observations.into_iter().zip(comp1.values))
            .zip(comp2.observations.into_iter().zip(comp2.values))
            .zip(keep.iter());

        for (((key, (obs1, vals1)), (obs2, vals2)), &keep) in rows {
            if keep {
                out.keys.push(key);
                out.comp1.observations.push(obs1);
                out.comp1.values.push(vals1);
                out.comp2.observations.push(obs2);
                out.comp2.values.push(vals2);
            }
        }
        out
    }
}

/// Index a table by key, rejecting duplicates.
fn index_by_key(table: FeatureTable) -> Result<BTreeMap<String, FeatureRecord>> {
    let mut index = BTreeMap::new();
    for record in table.records {
        if index.contains_key(&record.key) {
            return Err(ConcordError::DuplicateKey {
                table: table.label,
                key: record.key,
            });
        }
        index.insert(record.key.clone(), record);
    }
    Ok(index)
}

/// Intersect two tables on their key and sort both by key.
pub fn align(comp1: FeatureTable, comp2: FeatureTable) -> Result<AlignedPair> {
    if comp1.key_column != comp2.key_column {
        return Err(ConcordError::schema(comp2.label, comp1.key_column));
    }

    let (n1, n2) = (comp1.len(), comp2.len());
    let key_column = comp1.key_column.clone();
    let label1 = comp1.label.clone();
    let label2 = comp2.label.clone();
    let columns1 = comp1.columns.clone();
    let columns2 = comp2.columns.clone();

    let index1 = index_by_key(comp1)?;
    let mut index2 = index_by_key(comp2)?;

    let shared = index1.keys().filter(|k| index2.contains_key(*k)).count();
    if shared == 0 {
        return Err(ConcordError::EmptyInput);
    }

    let mut pair = AlignedPair {
        key_column,
        keys: Vec::with_capacity(shared),
        comp1: AlignedSide::with_capacity(label1, columns1, shared),
        comp2: AlignedSide::with_capacity(label2, columns2, shared),
    };

    // BTreeMap iteration is already in key order.
    for (key, record1) in index1 {
        if let Some(record2) = index2.remove(&key) {
            pair.keys.push(key);
            pair.comp1.push(record1);
            pair.comp2.push(record2);
        }
    }

    debug!(dropped_comp1 = n1 - shared, dropped_comp2 = n2 - shared, "Dropped unshared keys");
    info!(comp1 = n1, comp2 = n2, shared, "Aligned comparison tables");

    Ok(pair)
}
