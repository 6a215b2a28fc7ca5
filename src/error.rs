//! Error types surfaced to the user.
//!
//! Every pipeline failure maps to one of four user-facing kinds:
//! source parsing, no matching columns, no valid records, or a store
//! failure. Store failures during the replace-all sequence carry the
//! partial-commit state explicitly, since there is no rollback.

use std::path::PathBuf;

use thiserror::Error;

/// Failure communicating with the remote tabular store.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::new(err.to_string())
    }
}

/// Top-level error for a single upload or read-back run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read '{path}': {reason}")]
    SourceParse { path: PathBuf, reason: String },

    #[error("input contains none of the expected columns ({expected})")]
    NoMatchingColumns { expected: String },

    #[error("no valid records remain after cleaning the input")]
    NoValidRecords,

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error(
        "store left partially updated: old rows were deleted and {committed_batches} of \
         {total_batches} batch(es) ({committed_records} record(s)) were inserted before the \
         store failed: {source}"
    )]
    StorePartial {
        committed_batches: usize,
        total_batches: usize,
        committed_records: usize,
        source: StoreError,
    },
}

impl SyncError {
    pub fn source_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SyncError::SourceParse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
