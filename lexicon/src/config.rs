use serde::{Deserialize, Serialize};

/// Query-side configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All similarity and syllabification options from `lexicon_core::Config`
///   (flattened via serde)
/// - Pagination defaults
/// - Limits on fuzzy expansion
///
/// # Example
///
/// ```rust
/// use lexicon::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.default_page_size, 20);
/// let tables = config.base().tables();
/// assert!(tables.initials().is_equivalent("n", "l"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base configuration fields (similarity rules, syllable window)
    #[serde(flatten)]
    pub base: lexicon_core::Config,

    /// Page size used when a caller does not pick one.
    pub default_page_size: usize,

    /// Fuzzy initials variants longer than this are not generated; the
    /// initials as typed are always searched.
    pub max_initials_len: usize,

    /// Regex standing for exactly one syllable in transpiled patterns.
    pub syllable_placeholder: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base: lexicon_core::Config::default(),
            default_page_size: 20,
            max_initials_len: 20,
            syllable_placeholder: r"\w+".to_string(),
        }
    }
}

impl SearchConfig {
    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Convert this config into the base config used to build the index.
    pub fn into_base(self) -> lexicon_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &lexicon_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut lexicon_core::Config {
        &mut self.base
    }
}
