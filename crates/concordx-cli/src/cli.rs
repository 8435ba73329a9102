//! Command-line arguments.

use std::path::{Path, PathBuf};

use clap::Parser;
use concordx_common::{Mode, Result};
use concordx_config::RunConfig;

#[derive(Debug, Parser)]
#[command(name = "concordx")]
#[command(about = "Score how consistently features change across two differential comparisons", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory containing both comparison files
    #[arg(short = 'i', long, value_name = "DIR")]
    pub input_folder: Option<PathBuf>,

    /// Comparison 1 statistics (TSV)
    #[arg(short = 'a', long, value_name = "TSV")]
    pub comp1_file: PathBuf,

    /// Comparison 2 statistics (TSV)
    #[arg(short = 'b', long, value_name = "TSV")]
    pub comp2_file: PathBuf,

    /// Output table (TSV)
    #[arg(short = 'o', long, value_name = "TSV")]
    pub output_file: PathBuf,

    /// What the keys name: gene or pathway
    #[arg(short = 'm', long, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Effect size column
    #[arg(short = 'e', long, value_name = "COLUMN")]
    pub effect: Option<String>,

    /// Key column holding gene or pathway names
    #[arg(short = 'n', long, value_name = "COLUMN")]
    pub gname: Option<String>,

    /// Adjusted p-value column
    #[arg(short = 'f', long, value_name = "COLUMN")]
    pub fdr: Option<String>,

    /// GTF annotation used to flag protein-coding genes
    #[arg(short = 'g', long, value_name = "GTF")]
    pub gtf: Option<PathBuf>,

    /// TOML settings file (falls back to $CONCORDX_CONFIG)
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Base seed for the permutation draws
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Permutation worker threads (0 = all cores)
    #[arg(long, value_name = "INT")]
    pub workers: Option<usize>,

    /// Write a JSON run summary here
    #[arg(long, value_name = "JSON")]
    pub summary: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn comp1_path(&self) -> PathBuf {
        self.resolve(&self.comp1_file)
    }

    pub fn comp2_path(&self) -> PathBuf {
        self.resolve(&self.comp2_file)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        match &self.input_folder {
            Some(dir) => dir.join(file),
            None => file.to_path_buf(),
        }
    }

    /// Settings file (or defaults) with the command-line flags on top,
    /// validated as a whole.
    pub fn resolve_config(&self) -> Result<RunConfig> {
        let mut config = RunConfig::read(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Flags given on the command line win over file settings.
    pub fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(ref effect) = self.effect {
            config.columns.effect = effect.clone();
        }
        if let Some(ref key) = self.gname {
            config.columns.key = key.clone();
        }
        if let Some(ref fdr) = self.fdr {
            config.columns.significance = fdr.clone();
        }
        if let Some(seed) = self.seed {
            config.permutation.seed_base = seed;
        }
        if let Some(workers) = self.workers {
            config.permutation.workers = workers;
        }
    }
}
