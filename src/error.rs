// Error types for the analysis library.
//
// Callers branch on these: input-side problems (missing or unreadable files),
// structural problems that make the output wrong (shape and label mismatches),
// and output-side problems are kept apart. Row-level parse failures are not
// errors at all; they end up in `Diagnostics` instead.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for sptm operations.
#[derive(Debug, Error)]
pub enum SptmError {
    /// An input file does not exist.
    #[error("input file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An input file exists but could not be read or parsed as delimited text.
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Table widths disagree, or a table that must have rows is empty.
    #[error("shape error: {0}")]
    Shape(String),

    /// The labels file has no entry for this topic index.
    #[error("no label for topic {topic} (labels file has {available} entries)")]
    MissingLabel { topic: usize, available: usize },

    /// A numeric cell that must be a usable probability weight is not one.
    #[error("invalid value at row {row}, column {column}: {value:?}")]
    InvalidValue {
        row: usize,
        column: usize,
        value: String,
    },

    /// An environment or command-line setting could not be interpreted.
    #[error("configuration error: {0}")]
    Config(String),

    /// The output path could not be created or written.
    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON export failed.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for sptm operations.
pub type Result<T> = std::result::Result<T, SptmError>;
