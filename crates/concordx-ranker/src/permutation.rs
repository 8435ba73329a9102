//! Permutation null for concordance scores.
//!
//! Each draw shuffles the comparison-1 rows and the comparison-2 rows with two
//! independent seeded permutations and re-scores the shuffled pairing. The k
//! draws run on a rayon pool and are joined into a k×n `NullMatrix`; a draw
//! that keeps failing aborts the whole run rather than shrinking k.

use std::panic::{self, AssertUnwindSafe};

use concordx_common::{ConcordError, Observation, Result};
use concordx_config::PermutationConfig;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scorer::score_vector;

// ── Draw count ──────────────────────────────────────────────────────────────

/// How many draws a feature set of size n gets: n² below the cutoff,
/// otherwise a fixed ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawPolicy {
    pub small_n_cutoff: usize,
    pub max_draws: usize,
}

impl Default for DrawPolicy {
    fn default() -> Self {
        Self {
            small_n_cutoff: 200,
            max_draws: 40_000,
        }
    }
}

impl DrawPolicy {
    pub fn draw_count(&self, n: usize) -> usize {
        if n < self.small_n_cutoff {
            n * n
        } else {
            self.max_draws
        }
    }
}

// ── Seeding ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSeeds {
    pub comp1: u64,
    pub comp2: u64,
}

/// Seeds for draw d: `base + d` for comparison 1, `base + d + offset` for
/// comparison 2. `offset` must be at least k so the ranges never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStrategy {
    pub base: u64,
    pub offset: u64,
}

impl Default for SeedStrategy {
    fn default() -> Self {
        Self {
            base: 0,
            offset: 40_000,
        }
    }
}

impl SeedStrategy {
    pub fn new(base: u64, offset: u64) -> Self {
        Self { base, offset }
    }

    pub fn seeds(&self, draw: usize) -> DrawSeeds {
        let comp1 = self.base.wrapping_add(draw as u64);
        DrawSeeds {
            comp1,
            comp2: comp1.wrapping_add(self.offset),
        }
    }
}

// ── Draw task ───────────────────────────────────────────────────────────────

/// One unit of permutation work. Implementations must be pure functions of
/// their arguments: the engine may call `run` again for the same draw.
pub trait DrawTask: Send + Sync {
    fn run(
        &self,
        draw: usize,
        seeds: DrawSeeds,
        comp1: &[Observation],
        comp2: &[Observation],
    ) -> anyhow::Result<Vec<f64>>;
}

/// The standard draw: two independent seeded shuffles, then score.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShuffleDraw;

impl DrawTask for ShuffleDraw {
    fn run(
        &self,
        _draw: usize,
        seeds: DrawSeeds,
        comp1: &[Observation],
        comp2: &[Observation],
    ) -> anyhow::Result<Vec<f64>> {
        let mut shuffled1 = comp1.to_vec();
        let mut shuffled2 = comp2.to_vec();
        shuffled1.shuffle(&mut ChaCha8Rng::seed_from_u64(seeds.comp1));
        shuffled2.shuffle(&mut ChaCha8Rng::seed_from_u64(seeds.comp2));
        Ok(score_vector(&shuffled1, &shuffled2))
    }
}

// ── Null matrix ─────────────────────────────────────────────────────────────

/// k draws × n features, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NullMatrix {
    draws: usize,
    features: usize,
    values: Vec<f64>,
}

impl NullMatrix {
    pub fn empty(features: usize) -> Self {
        Self {
            draws: 0,
            features,
            values: Vec::new(),
        }
    }

    /// Number of draws (rows).
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Number of features (columns).
    pub fn features(&self) -> usize {
        self.features
    }

    pub fn row(&self, draw: usize) -> &[f64] {
        &self.values[draw * self.features..(draw + 1) * self.features]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics; an empty matrix has no rows either way
        self.values.chunks_exact(self.features.max(1))
    }

    pub fn get(&self, draw: usize, feature: usize) -> f64 {
        self.values[draw * self.features + feature]
    }

    pub fn column(&self, feature: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows().map(move |row| row[feature])
    }
}

// ── Engine ──────────────────────────────────────────────────────────────────

pub struct PermutationEngine<T: DrawTask = ShuffleDraw> {
    task: T,
    policy: DrawPolicy,
    seeds: SeedStrategy,
    max_attempts: u32,
    pool: rayon::ThreadPool,
}

impl<T: DrawTask> std::fmt::Debug for PermutationEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationEngine")
            .field("policy", &self.policy)
            .field("seeds", &self.seeds)
            .field("max_attempts", &self.max_attempts)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl PermutationEngine<ShuffleDraw> {
    pub fn from_config(config: &PermutationConfig) -> Result<Self> {
        Self::with_task(ShuffleDraw, config)
    }
}

impl<T: DrawTask> PermutationEngine<T> {
    /// Build an engine around a custom draw task.
    pub fn with_task(task: T, config: &PermutationConfig) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(ConcordError::Config("max_attempts must be at least 1".to_string()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("concordx-draw-{i}"))
            .build()
            .map_err(|e| ConcordError::Other(anyhow::anyhow!("failed to build worker pool: {e}")))?;

        Ok(Self {
            task,
            policy: DrawPolicy {
                small_n_cutoff: config.small_n_cutoff,
                max_draws: config.max_draws,
            },
            seeds: SeedStrategy::new(config.seed_base, config.seed_offset),
            max_attempts: config.max_attempts,
            pool,
        })
    }

    pub fn policy(&self) -> DrawPolicy {
        self.policy
    }

    pub fn seed_strategy(&self) -> SeedStrategy {
        self.seeds
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every draw and join them into the null matrix.
    ///
    /// The whole k×n matrix is allocated before the first draw starts:
    /// `8 · k · n` bytes, where k is at most `max_draws`. With the default
    /// 40 000 draws and 20 000 features that is about 6.4 GB.
    ///
    /// Fails with `PermutationWorkerFailure` if any draw exhausts its attempts;
    /// no partial matrix is ever returned.
    pub fn run(&self, comp1: &[Observation], comp2: &[Observation]) -> Result<NullMatrix> {
        if comp1.len() != comp2.len() {
            return Err(ConcordError::Other(anyhow::anyhow!(
                "comparison lengths differ: {} vs {}",
                comp1.len(),
                comp2.len()
            )));
        }

        let n = comp1.len();
        let k = self.policy.draw_count(n);
        if n == 0 || k == 0 {
            return Ok(NullMatrix::empty(n));
        }

        info!(features = n, draws = k, workers = self.workers(), "Running permutation draws");

        let mut values = vec![0.0f64; k * n];
        self.pool.install(|| {
            values
                .par_chunks_mut(n)
                .enumerate()
                .try_for_each(|(draw, row)| -> Result<()> {
                    let scores = self.run_draw(draw, comp1, comp2)?;
                    row.copy_from_slice(&scores);
                    Ok(())
                })
        })?;

        debug!(draws = k, "All permutation draws joined");
        Ok(NullMatrix {
            draws: k,
            features: n,
            values,
        })
    }

    /// One draw with retries. A panic inside the task counts as a failed attempt.
    fn run_draw(&self, draw: usize, comp1: &[Observation], comp2: &[Observation]) -> Result<Vec<f64>> {
        let seeds = self.seeds.seeds(draw);
        let mut reason = String::new();

        for attempt in 1..=self.max_attempts {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.task.run(draw, seeds, comp1, comp2)
            }));

            match outcome {
                Ok(Ok(scores)) if scores.len() == comp1.len() => return Ok(scores),
                Ok(Ok(scores)) => {
                    reason = format!("expected {} scores, got {}", comp1.len(), scores.len());
                }
                Ok(Err(e)) => reason = format!("{e:#}"),
                Err(payload) => reason = panic_message(payload.as_ref()),
            }
            warn!(draw, attempt, max_attempts = self.max_attempts, %reason, "Permutation draw failed");
        }

        Err(ConcordError::PermutationWorkerFailure {
            draw,
            attempts: self.max_attempts,
            reason,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
