use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the ingestion layer.
pub type IngestResult<T> = Result<T, IngestError>;

/// Everything that can go wrong while turning observation files into records.
///
/// Only [`IngestError::MissingFile`] is recoverable, and the loaders that
/// tolerate missing items never surface it: they check for the file up front
/// and skip with a diagnostic. Every other kind aborts the call it came from.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error(
        "number of stations ({names}) and rows of velocity data ({rows}) differ in {}",
        path.display()
    )]
    RowCountMismatch {
        path: PathBuf,
        names: usize,
        rows: usize,
    },

    #[error("no stations left after applying the blacklist")]
    EmptyAfterFilter,

    #[error("no data for channel '{0}' (supported: Z, T)")]
    UnsupportedChannel(String),

    #[error("malformed structure in {}: field '{field}' {reason}", path.display())]
    MalformedStructure {
        path: PathBuf,
        field: String,
        reason: String,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("reading matrix container {}: {source}", path.display())]
    Npz {
        path: PathBuf,
        #[source]
        source: ndarray_npy::ReadNpzError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("writing table: {0}")]
    Csv(#[from] csv::Error),
}

impl IngestError {
    pub(crate) fn malformed(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        IngestError::MalformedStructure {
            path: path.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
