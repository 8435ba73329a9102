//! concordx-common — Shared types and errors used across all concordx crates.

pub mod error;
pub mod entities;

// Re-export commonly used types
pub use entities::{
    Direction, FeatureRecord, FeatureTable, Mode, Observation, ResultRecord, ResultTable,
};
pub use error::{ConcordError, Result};
