// Flat-file inputs: the player table, the draft order, and rule tables.

pub mod order;
pub mod players;
pub mod rules;

use crate::draft::position::SchemaError;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Any problem reading an input file. Loading never skips a bad row: the
/// whole file is rejected so a simulation never runs on partial data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}, row {row}: {message}")]
    Invalid {
        path: String,
        row: usize,
        message: String,
    },

    #[error("{path}, row {row}: {source}")]
    Schema {
        path: String,
        row: usize,
        source: SchemaError,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Line number of the `index`-th data record (the header is line 1).
pub(crate) fn row_number(index: usize) -> usize {
    index + 2
}

pub(crate) fn open(path: &std::path::Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
