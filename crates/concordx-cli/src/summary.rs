//! JSON run summary.

use std::path::Path;

use chrono::{DateTime, Utc};
use concordx_common::Mode;
use concordx_ranker::ConcordanceStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub version: String,
    pub mode: Mode,
    pub comp1_path: String,
    pub comp2_path: String,
    pub output_path: String,
    pub gtf_path: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    #[serde(flatten)]
    pub stats: ConcordanceStats,
}

pub struct SummaryPaths<'a> {
    pub comp1: &'a Path,
    pub comp2: &'a Path,
    pub output: &'a Path,
    pub gtf: Option<&'a Path>,
}

impl RunSummary {
    pub fn new(
        mode: Mode,
        paths: SummaryPaths<'_>,
        stats: ConcordanceStats,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode,
            comp1_path: paths.comp1.display().to_string(),
            comp2_path: paths.comp2.display().to_string(),
            output_path: paths.output.display().to_string(),
            gtf_path: paths.gtf.map(|p| p.display().to_string()),
            started_at,
            finished_at,
            elapsed_ms: (finished_at - started_at).num_milliseconds(),
            stats,
        }
    }

    pub async fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use concordx_ranker::SeedStrategy;
    use pretty_assertions::assert_eq;

    fn stats() -> ConcordanceStats {
        ConcordanceStats {
            comp1_rows: 3,
            comp2_rows: 3,
            aligned: 3,
            zero_score: 1,
            surviving: 2,
            draws: 4,
            workers: 2,
            seeds: SeedStrategy::new(0, 40_000),
            high: 1,
            low: 1,
        }
    }

    #[test]
    fn test_summary_json_fields() {
        let started = Utc::now();
        let finished = started + Duration::milliseconds(1500);
        let summary = RunSummary::new(
            Mode::Gene,
            SummaryPaths {
                comp1: Path::new("a.tsv"),
                comp2: Path::new("b.tsv"),
                output: Path::new("out.tsv"),
                gtf: None,
            },
            stats(),
            started,
            finished,
        );

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["mode"], "gene");
        assert_eq!(value["elapsed_ms"], 1500);
        assert_eq!(value["draws"], 4);
        assert_eq!(value["zero_score"], 1);
        assert_eq!(value["seeds"]["offset"], 40_000);
        assert!(value["gtf_path"].is_null());
    }

    #[tokio::test]
    async fn test_summary_written_to_disk() {
        let dir = concordx_test_utils::TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        let now = Utc::now();
        let summary = RunSummary::new(
            Mode::Pathway,
            SummaryPaths {
                comp1: Path::new("a.tsv"),
                comp2: Path::new("b.tsv"),
                output: Path::new("out.tsv"),
                gtf: Some(Path::new("genes.gtf")),
            },
            stats(),
            now,
            now,
        );
        summary.write(&path).await.unwrap();

        let back: RunSummary = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.stats, stats());
        assert_eq!(back.gtf_path.as_deref(), Some("genes.gtf"));
    }
}
