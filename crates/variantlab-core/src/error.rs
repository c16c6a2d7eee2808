//! Error type shared by every pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

/// Any failure that aborts an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("table '{table}' already has a column '{column}'")]
    DuplicateColumn { table: String, column: String },

    #[error("table '{table}' row {row} has {got} fields, expected {expected}")]
    RaggedRow {
        table: String,
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("column '{column}' in table '{table}' holds non-numeric value '{value}'")]
    NonNumeric {
        table: String,
        column: String,
        value: String,
    },

    #[error("column '{column}' in table '{table}' has no non-null values")]
    EmptyColumn { table: String, column: String },

    #[error("failed to render plot {}: {source}", .path.display())]
    Plot {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },

    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing_column(table: &str, column: &str) -> Self {
        Self::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
