//! Tab-separated comparison table loader.
//!
//! Every input row becomes a `FeatureRecord`: the key, the parsed effect and
//! significance, and the raw text of all non-key columns. Rows with a missing
//! value in any column are dropped.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use concordx_common::{ConcordError, FeatureRecord, FeatureTable, Observation, Result};
use concordx_config::ColumnsConfig;
use tracing::{debug, info, warn};

/// Field values treated as missing, as written by common data-frame exports.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(field: &str) -> bool {
    NA_VALUES.contains(&field)
}

/// Name header cells the way data-frame readers do: an empty cell at
/// position j becomes `Unnamed: j`, repeated names get `.1`, `.2`, ...
pub fn normalise_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(j, name)| {
            let base = if name.is_empty() {
                format!("Unnamed: {j}")
            } else {
                name.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let out = if *count == 0 { base.clone() } else { format!("{base}.{count}") };
            *count += 1;
            out
        })
        .collect()
}

fn column_index(headers: &[String], table: &str, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ConcordError::schema(table, column))
}

fn parse_number(table: &str, row: usize, column: &str, field: &str) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|_| ConcordError::InvalidValue {
        table: table.to_string(),
        row,
        column: column.to_string(),
        value: field.to_string(),
    })
}

/// Parse a tab-separated comparison table.
///
/// Fails with `Schema` when the key, effect or significance column is
/// absent, and with `InvalidValue` when an effect is not a finite number or
/// a significance is not within [0, 1].
pub fn parse_feature_table<R: Read>(label: &str, reader: R, columns: &ColumnsConfig) -> Result<FeatureTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = normalise_headers(reader.headers()?.iter());
    let key_idx = column_index(&headers, label, &columns.key)?;
    let effect_idx = column_index(&headers, label, &columns.effect)?;
    let sig_idx = column_index(&headers, label, &columns.significance)?;

    let value_columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != key_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut table = FeatureTable::new(label, columns.key.clone(), value_columns);
    let mut dropped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;

        // Short rows are padded with missing values, so they drop like any
        // other incomplete row. Extra fields have no column to belong to.
        if record.len() > headers.len() {
            return Err(ConcordError::InvalidValue {
                table: label.to_string(),
                row,
                column: format!("<{} fields, expected {}>", record.len(), headers.len()),
                value: record.iter().skip(headers.len()).collect::<Vec<_>>().join("\t"),
            });
        }
        if record.len() < headers.len() || record.iter().any(is_missing) {
            dropped += 1;
            debug!(table = label, row, "Dropping row with missing values");
            continue;
        }

        let effect = parse_number(label, row, &columns.effect, &record[effect_idx])?;
        let significance = parse_number(label, row, &columns.significance, &record[sig_idx])?;

        if !effect.is_finite() {
            return Err(ConcordError::InvalidValue {
                table: label.to_string(),
                row,
                column: columns.effect.clone(),
                value: record[effect_idx].to_string(),
            });
        }
        if !(0.0..=1.0).contains(&significance) {
            return Err(ConcordError::InvalidValue {
                table: label.to_string(),
                row,
                column: columns.significance.clone(),
                value: record[sig_idx].to_string(),
            });
        }

        let values = record
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != key_idx)
            .map(|(_, v)| v.to_string())
            .collect();

        table.records.push(FeatureRecord {
            key: record[key_idx].to_string(),
            observation: Observation::new(effect, significance),
            values,
        });
    }

    if dropped > 0 {
        warn!(table = label, dropped, "Dropped rows with missing values");
    }
    info!(table = label, rows = table.len(), columns = table.columns.len() + 1, "Loaded comparison table");

    Ok(table)
}

/// Read and parse a comparison table from disk.
pub async fn load_feature_table(path: &Path, label: &str, columns: &ColumnsConfig) -> Result<FeatureTable> {
    debug!(table = label, path = %path.display(), "Reading comparison table");
    let content = tokio::fs::read(path).await?;
    parse_feature_table(label, content.as_slice(), columns)
}
