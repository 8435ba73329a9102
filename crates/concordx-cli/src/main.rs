//! concordx — concordance scoring across two differential comparisons.
//! Entry point for the command-line binary.

mod cli;
mod summary;

use std::collections::HashSet;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use concordx_common::Mode;
use concordx_io::{load_feature_table, load_protein_coding_genes, write_results_to_path};
use concordx_ranker::run_concordance;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::summary::{RunSummary, SummaryPaths};

fn init_tracing(verbose: bool) {
    let default = if verbose { "concordx=debug,info" } else { "concordx=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let started_at = Utc::now();
    info!("concordx {}", env!("CARGO_PKG_VERSION"));

    let config = cli.resolve_config().context("loading configuration")?;
    info!(
        mode = %config.mode,
        key = %config.columns.key,
        effect = %config.columns.effect,
        significance = %config.columns.significance,
        "Configuration loaded"
    );

    let comp1_path = cli.comp1_path();
    let comp2_path = cli.comp2_path();

    let (comp1, comp2) = tokio::try_join!(
        async {
            load_feature_table(&comp1_path, "comp1", &config.columns)
                .await
                .with_context(|| format!("loading {}", comp1_path.display()))
        },
        async {
            load_feature_table(&comp2_path, "comp2", &config.columns)
                .await
                .with_context(|| format!("loading {}", comp2_path.display()))
        },
    )?;

    let coding_genes: HashSet<String> = match (&cli.gtf, config.mode) {
        (Some(gtf), Mode::Gene) => load_protein_coding_genes(gtf)
            .await
            .with_context(|| format!("loading {}", gtf.display()))?,
        (None, Mode::Gene) => {
            warn!("No GTF annotation given; every gene will be marked non-coding");
            HashSet::new()
        }
        (Some(_), Mode::Pathway) => {
            warn!("GTF annotation ignored in pathway mode");
            HashSet::new()
        }
        (None, Mode::Pathway) => HashSet::new(),
    };

    let run_config = config.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        run_concordance(comp1, comp2, &run_config, &coding_genes)
    })
    .await
    .context("concordance task panicked")?
    .context("concordance run failed")?;

    write_results_to_path(&cli.output_file, &outcome.table, config.output.precision)
        .with_context(|| format!("writing {}", cli.output_file.display()))?;

    if let Some(ref summary_path) = cli.summary {
        let summary = RunSummary::new(
            config.mode,
            SummaryPaths {
                comp1: &comp1_path,
                comp2: &comp2_path,
                output: &cli.output_file,
                gtf: cli.gtf.as_deref(),
            },
            outcome.stats.clone(),
            started_at,
            Utc::now(),
        );
        summary
            .write(summary_path)
            .await
            .with_context(|| format!("writing {}", summary_path.display()))?;
        info!(path = %summary_path.display(), "Wrote run summary");
    }

    info!(
        rows = outcome.table.len(),
        high = outcome.stats.high,
        low = outcome.stats.low,
        "Done"
    );
    Ok(())
}
