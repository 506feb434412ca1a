//! lexicon crate root
//!
//! This crate provides the query side over a `lexicon-core` index: a greedy
//! syllabifier, the pattern transpiler that re-anchors text patterns onto
//! space-delimited plain romanization, and a high-level `Engine` that
//! resolves predicate sets to paginated results.
//!
//! Public API exported here:
//! - `Engine` and `SearchPage` from `engine`
//! - `Query` and `Pagination` from `query`
//! - `Transpiler` from `transpile`
//! - `Syllabifier` and `Token` from `syllabify`
//! - `SearchConfig` from `config`
//! - `QueryError` from `error`

pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod syllabify;
pub mod transpile;

// Convenience re-exports for common types used by callers.
pub use config::SearchConfig;
pub use engine::{Engine, SearchPage};
pub use error::QueryError;
pub use query::{Pagination, Query};
pub use syllabify::{Syllabifier, Token};
pub use transpile::Transpiler;

pub use lexicon_core::{
    Category, CorpusIndex, Entry, IndexCache, PinyinRomanizer, Romanizer, StructureTag,
    TableRomanizer,
};
