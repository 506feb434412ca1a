//! lexicon-core
//!
//! Entry model, romanization contract, phonological similarity tables,
//! structural templates and the multi-key corpus index shared by the query
//! crate (`lexicon`).
//!
//! The index is a plain in-memory value built once per process and cached on
//! disk with bincode, keyed by a content hash of the source files.
//!
//! Public API:
//! - `Entry` - One lexical item with precomputed pronunciation attributes
//! - `Romanizer` - Per-character reading service (pinyin crate or a table)
//! - `SimilarityTables` - Confusable initials/finals for homophone expansion
//! - `CorpusIndex` - Inverted maps from lookup keys to entry positions
//! - `IndexCache` - Content-hashed on-disk snapshot of a `CorpusIndex`
//! - `Config` - Similarity table configuration
use serde::{Deserialize, Serialize};

pub mod cache;
pub use cache::IndexCache;

pub mod entry;
pub use entry::{Category, Entry};

pub mod error;
pub use error::{CacheError, EntryError};

pub mod fuzzy;
pub use fuzzy::{FuzzyMap, SimilarityTables};

pub mod index;
pub use index::{CharFrequency, CorpusIndex, FrequencyPosition, Position};

pub mod romanize;
pub use romanize::{PinyinRomanizer, Reading, Romanization, Romanizer, TableRomanizer};

pub mod structure;
pub use structure::StructureTag;

pub mod trie;
pub use trie::TrieNode;

/// Generic configuration for index construction.
///
/// Query-level options (page sizes, expansion limits) belong in
/// `SearchConfig` in the `lexicon` crate, which flattens this struct.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Confusable initial rules (e.g. "zh>z", "n=l")
    pub similar_initials: Vec<String>,

    /// Confusable final rules (e.g. "an>ang", "in=ing")
    pub similar_finals: Vec<String>,

    /// Longest plain syllable considered when splitting typed pinyin.
    pub max_syllable_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similar_initials: fuzzy::default_initial_rules(),
            similar_finals: fuzzy::default_final_rules(),
            // "zhuang" / "shuang" / "chuang"
            max_syllable_len: 6,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Similarity tables described by this configuration.
    pub fn tables(&self) -> SimilarityTables {
        SimilarityTables::from_rules(&self.similar_initials, &self.similar_finals)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Whether `ch` is a CJK unified or compatibility ideograph.
    pub fn is_cjk(ch: char) -> bool {
        matches!(
            ch as u32,
            0x4E00..=0x9FFF
                | 0x3400..=0x4DBF
                | 0x20000..=0x2A6DF
                | 0x2A700..=0x2B73F
                | 0x2B740..=0x2B81F
                | 0x2B820..=0x2CEAF
                | 0x2CEB0..=0x2EBEF
                | 0xF900..=0xFAFF
                | 0x2F800..=0x2FA1F
        )
    }

    /// Whether `s` contains at least one ideograph.
    pub fn has_cjk(s: &str) -> bool {
        s.chars().any(is_cjk)
    }
}
