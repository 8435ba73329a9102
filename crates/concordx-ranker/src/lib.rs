//! concordx-ranker — Concordance scoring and permutation testing engine.
//!
//! Aligns two comparison tables, scores each shared feature, builds a
//! permutation null and turns it into an empirical p-value per feature.

pub mod aligner;
pub mod weights;
pub mod scorer;
pub mod permutation;
pub mod significance;
pub mod assembler;
pub mod pipeline;

pub use aligner::{align, AlignedPair};
pub use permutation::{DrawPolicy, DrawTask, NullMatrix, PermutationEngine, SeedStrategy, ShuffleDraw};
pub use pipeline::{run_concordance, ConcordanceOutcome, ConcordanceStats};
pub use significance::Significance;
