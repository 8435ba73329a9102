//! Tab-separated result writer.

use std::io::Write;
use std::path::Path;

use concordx_common::{ResultRecord, ResultTable, Result};
use tracing::info;

fn coding_text(coding: bool) -> &'static str {
    if coding {
        "True"
    } else {
        "False"
    }
}

fn row_fields(record: &ResultRecord, precision: usize) -> Vec<String> {
    let mut fields = Vec::with_capacity(record.comp1_values.len() + record.comp2_values.len() + 5);
    fields.push(record.key.clone());
    fields.extend(record.comp1_values.iter().cloned());
    fields.extend(record.comp2_values.iter().cloned());
    fields.push(format!("{:.*}", precision, record.score));
    fields.push(format!("{:.*}", precision, record.p_value));
    fields.push(record.direction.as_str().to_string());
    if let Some(coding) = record.coding {
        fields.push(coding_text(coding).to_string());
    }
    fields
}

/// Write `table` as TSV. Score and p are printed with `precision`
/// fractional digits. Echoed input columns keep their input text byte for
/// byte and are not reformatted, so numeric input columns can differ in
/// digits from output that formatted every float column at `precision`.
pub fn write_results<W: Write>(writer: W, table: &ResultTable, precision: usize) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    out.write_record(table.header())?;
    for record in &table.records {
        out.write_record(row_fields(record, precision))?;
    }
    out.flush()?;
    Ok(())
}

/// Write results to `path` through a temporary file in the same directory,
/// so a failed run never leaves a partial table behind.
pub fn write_results_to_path(path: &Path, table: &ResultTable, precision: usize) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write_results(tmp.as_file_mut(), table, precision)?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), rows = table.len(), "Wrote results");
    Ok(())
}
