//! GTF annotation scan for protein-coding gene names.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use concordx_common::{ConcordError, Result};
use tracing::{debug, info};

const GTF_FIELDS: usize = 9;
const FEATURE_FIELD: usize = 2;
const ATTRIBUTE_FIELD: usize = 8;

/// Look up an attribute value in a GTF attribute column, e.g.
/// `gene_id "ENSG0001"; gene_type "protein_coding"; gene_name "KRAS";`.
pub fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    attributes
        .split(';')
        .filter_map(|entry| entry.trim().split_once(' '))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}

/// Collect `gene_name` for every `transcript` record whose gene type is
/// `protein_coding`. GENCODE writes the type as `gene_type`, Ensembl as
/// `gene_biotype`; both are accepted.
pub fn parse_protein_coding_genes<R: BufRead>(reader: R) -> Result<HashSet<String>> {
    let mut genes = HashSet::new();
    let mut transcripts = 0usize;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < GTF_FIELDS {
            return Err(ConcordError::InvalidValue {
                table: "gtf".to_string(),
                row: i + 1,
                column: "attribute".to_string(),
                value: line.chars().take(80).collect(),
            });
        }
        if fields[FEATURE_FIELD] != "transcript" {
            continue;
        }
        transcripts += 1;

        let attrs = fields[ATTRIBUTE_FIELD];
        let gene_type = attribute(attrs, "gene_type").or_else(|| attribute(attrs, "gene_biotype"));
        if gene_type != Some("protein_coding") {
            continue;
        }
        if let Some(name) = attribute(attrs, "gene_name") {
            genes.insert(name.to_string());
        }
    }

    info!(transcripts, coding_genes = genes.len(), "Parsed GTF annotation");
    Ok(genes)
}

/// Stream a GTF file from disk on the blocking pool.
pub async fn load_protein_coding_genes(path: &Path) -> Result<HashSet<String>> {
    debug!(path = %path.display(), "Reading GTF annotation");
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = File::open(&path)?;
        parse_protein_coding_genes(BufReader::new(file))
    })
    .await
    .map_err(|e| ConcordError::Other(anyhow::anyhow!("GTF reader task failed: {e}")))?
}
