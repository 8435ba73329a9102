use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConcordError {
    #[error("Schema error: table '{table}' has no column '{column}'")]
    Schema { table: String, column: String },

    #[error("Empty input: the two tables share no feature keys")]
    EmptyInput,

    #[error("Duplicate key '{key}' in table '{table}'")]
    DuplicateKey { table: String, key: String },

    #[error("Invalid value '{value}' in table '{table}' (row {row}, column '{column}')")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Permutation draw {draw} failed after {attempts} attempt(s): {reason}")]
    PermutationWorkerFailure {
        draw: usize,
        attempts: u32,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConcordError {
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConcordError>;
