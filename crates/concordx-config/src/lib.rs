//! Configuration loading for concordx.
//! Reads a TOML file from an explicit path or the path in the CONCORDX_CONFIG
//! env var; every field falls back to a built-in default.

use concordx_common::{ConcordError, Mode, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Env var consulted when no explicit config path is given.
pub const CONFIG_ENV_VAR: &str = "CONCORDX_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub permutation: PermutationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            columns: ColumnsConfig::default(),
            permutation: PermutationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_key_column")]
    pub key: String,
    #[serde(default = "default_effect_column")]
    pub effect: String,
    #[serde(default = "default_significance_column")]
    pub significance: String,
}

fn default_key_column()          -> String { "Unnamed: 0".to_string() }
fn default_effect_column()       -> String { "avg_log2FC".to_string() }
fn default_significance_column() -> String { "p_val_adj".to_string() }

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            key: default_key_column(),
            effect: default_effect_column(),
            significance: default_significance_column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationConfig {
    /// Feature counts below this use n² draws.
    #[serde(default = "default_small_n_cutoff")]
    pub small_n_cutoff: usize,
    /// Draw count for feature sets at or above the cutoff.
    #[serde(default = "default_max_draws")]
    pub max_draws: usize,
    #[serde(default)]
    pub seed_base: u64,
    /// Added to the draw seed for the comparison-2 shuffle. Must be at least
    /// `max_draws` so the two seed ranges never overlap.
    #[serde(default = "default_seed_offset")]
    pub seed_offset: u64,
    /// Worker threads; 0 means available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_small_n_cutoff() -> usize { 200 }
fn default_max_draws()      -> usize { 40_000 }
fn default_seed_offset()    -> u64   { 40_000 }
fn default_max_attempts()   -> u32   { 3 }

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            small_n_cutoff: default_small_n_cutoff(),
            max_draws: default_max_draws(),
            seed_base: 0,
            seed_offset: default_seed_offset(),
            workers: 0,
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Fractional digits written for score and p.
    #[serde(default = "default_precision")]
    pub precision: usize,
    #[serde(default = "default_comp1_suffix")]
    pub comp1_suffix: String,
    #[serde(default = "default_comp2_suffix")]
    pub comp2_suffix: String,
}

fn default_precision()    -> usize  { 64 }
fn default_comp1_suffix() -> String { "_comp1".to_string() }
fn default_comp2_suffix() -> String { "_comp2".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            comp1_suffix: default_comp1_suffix(),
            comp2_suffix: default_comp2_suffix(),
        }
    }
}


impl RunConfig {
    /// Load and validate configuration.
    /// An explicit path wins, then CONCORDX_CONFIG, then built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same lookup order as `load`, without validation. Callers that layer
    /// further overrides on top validate once they are applied.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConcordError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConcordError::Config(e.to_string()))
    }

    /// Reject settings that would make the permutation test ill-defined.
    pub fn validate(&self) -> Result<()> {
        let cols = &self.columns;
        for (name, value) in [("key", &cols.key), ("effect", &cols.effect), ("significance", &cols.significance)] {
            if value.is_empty() {
                return Err(ConcordError::Config(format!("columns.{name} must not be empty")));
            }
        }
        if cols.effect == cols.significance {
            return Err(ConcordError::Config(
                "effect and significance columns must differ".to_string(),
            ));
        }

        let perm = &self.permutation;
        if perm.max_draws == 0 {
            return Err(ConcordError::Config("permutation.max_draws must be positive".to_string()));
        }
        if perm.max_attempts == 0 {
            return Err(ConcordError::Config("permutation.max_attempts must be at least 1".to_string()));
        }
        let largest_k = perm
            .max_draws
            .max(perm.small_n_cutoff.saturating_sub(1).saturating_pow(2));
        if perm.seed_offset < largest_k as u64 {
            return Err(ConcordError::Config(format!(
                "permutation.seed_offset ({}) must be >= the largest draw count ({largest_k})",
                perm.seed_offset
            )));
        }
        if self.output.comp1_suffix == self.output.comp2_suffix {
            return Err(ConcordError::Config("output suffixes must differ".to_string()));
        }
        Ok(())
    }
}
