//! Error types for lexicon-core.
use std::path::PathBuf;

/// Rejected [`Entry`](crate::Entry) construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry text is empty")]
    EmptyText,
}

/// Failure to refresh the on-disk index cache.
///
/// Reading the cache never produces one of these: an unreadable cache is a
/// miss, not an error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode index: {0}")]
    Encode(#[from] bincode::Error),
}
