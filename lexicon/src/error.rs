//! Invalid-predicate failures reported by the query engine.

/// A query the engine refused to run.
///
/// Pagination errors are contract violations detected before the index is
/// touched. A pattern error is reported after transpilation, together with
/// what the engine tried to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("page must be at least 1, got {0}")]
    InvalidPage(i64),

    #[error("page size must not be negative, got {0}")]
    InvalidPageSize(i64),

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        pattern: String,
        /// Syllable-level pattern, present for phonetic queries.
        transpiled: Option<String>,
        message: String,
    },
}
