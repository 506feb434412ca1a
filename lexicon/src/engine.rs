//! Query engine over a shared, immutable corpus index.
//!
//! `Engine` composes the index, a romanizer and the search configuration
//! behind `Arc`s, so clones are cheap and every clone may serve queries from
//! its own thread. A search resolves each present predicate to a sorted set
//! of positions, intersects them in a fixed cheap-first order, and only then
//! runs the pattern scan over what is left.

use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use lexicon_core::fuzzy::expand_final_wildcard;
use lexicon_core::{
    utils, CorpusIndex, Entry, PinyinRomanizer, Position, Romanizer, SimilarityTables,
};

use crate::config::SearchConfig;
use crate::error::QueryError;
use crate::query::{Pagination, Query};
use crate::syllabify::Syllabifier;
use crate::transpile::{text_pattern, Transpiler};

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<'e> {
    /// Matches on this page, in corpus order.
    pub entries: Vec<&'e Entry>,
    /// Number of matches before pagination.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Search engine.
#[derive(Clone)]
pub struct Engine {
    index: Arc<CorpusIndex>,
    romanizer: Arc<dyn Romanizer>,
    tables: Arc<SimilarityTables>,
    config: Arc<SearchConfig>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("entries", &self.index.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Engine {
    /// Create an engine owning `index`.
    pub fn new(index: CorpusIndex, romanizer: Arc<dyn Romanizer>, config: SearchConfig) -> Self {
        Self::from_shared(Arc::new(index), romanizer, config)
    }

    /// Build the index from `entries` with the similarity tables of
    /// `config`, so fuzzy initials and fuzzy patterns agree.
    pub fn build(
        entries: Vec<Entry>,
        romanizer: Arc<dyn Romanizer>,
        config: SearchConfig,
    ) -> Self {
        let tables = config.base.tables();
        let index = CorpusIndex::build_with(entries, &tables);
        Self {
            index: Arc::new(index),
            romanizer,
            tables: Arc::new(tables),
            config: Arc::new(config),
        }
    }

    /// Create an engine over an index that is already shared.
    ///
    /// The index must have been built with `config`'s similarity tables;
    /// otherwise fuzzy patterns use the index's tables while fuzzy initials
    /// use the configured ones. [`Engine::build`] guarantees this.
    pub fn from_shared(
        index: Arc<CorpusIndex>,
        romanizer: Arc<dyn Romanizer>,
        config: SearchConfig,
    ) -> Self {
        let tables = config.base.tables();
        Self {
            index,
            romanizer,
            tables: Arc::new(tables),
            config: Arc::new(config),
        }
    }

    /// Engine with the `pinyin`-crate romanizer and default configuration.
    pub fn with_pinyin(index: CorpusIndex) -> Self {
        Self::new(index, Arc::new(PinyinRomanizer::new()), SearchConfig::default())
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// Get a cloned Arc to the index.
    pub fn index_arc(&self) -> Arc<CorpusIndex> {
        Arc::clone(&self.index)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn transpiler(&self) -> Transpiler<'_> {
        Transpiler::new(&self.index, self.romanizer.as_ref(), &self.config)
    }

    /// Run `query` and return the requested page.
    ///
    /// `page` is 1-indexed; a `page_size` of 0 returns every match. Both are
    /// checked before the index is consulted.
    pub fn search(
        &self,
        query: &Query,
        page: i64,
        page_size: i64,
    ) -> Result<SearchPage<'_>, QueryError> {
        let pagination = Pagination::new(page, page_size)?;
        self.search_page(query, pagination)
    }

    pub fn search_page(
        &self,
        query: &Query,
        pagination: Pagination,
    ) -> Result<SearchPage<'_>, QueryError> {
        let positions = self.matching_positions(query)?;
        let entries = pagination
            .window(&positions)
            .iter()
            .filter_map(|pos| self.index.entry(*pos))
            .collect();
        Ok(SearchPage {
            entries,
            total: positions.len(),
            page: pagination.page(),
            page_size: pagination.page_size(),
        })
    }

    /// First page of `query` at the configured default page size.
    pub fn search_first_page(&self, query: &Query) -> Result<SearchPage<'_>, QueryError> {
        let size = i64::try_from(self.config.default_page_size).unwrap_or(i64::MAX);
        self.search(query, 1, size)
    }

    /// Every match of `query`, unpaginated.
    pub fn search_all(&self, query: &Query) -> Result<Vec<&Entry>, QueryError> {
        Ok(self.search_page(query, Pagination::all())?.entries)
    }

    /// Ascending positions of every entry matching `query`.
    pub fn matching_positions(&self, query: &Query) -> Result<Vec<Position>, QueryError> {
        let mut live = Candidates::all();
        let idx = &self.index;

        if let Some(category) = query.category {
            live.narrow("category", idx.by_category(category).to_vec());
        }
        if let Some(length) = query.length {
            live.narrow("length", idx.by_length(length).to_vec());
        }
        if let Some(tag) = query.structure {
            live.narrow("structure", idx.by_structure(tag).to_vec());
        }
        if let Some(rhyme) = &query.rhyme {
            live.narrow("rhyme", idx.by_rhyme(rhyme).to_vec());
        }
        if let Some(tones) = &query.tones {
            live.narrow("tones", idx.by_tones(tones).to_vec());
        }
        if live.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(initials) = &query.initials {
            let mut set = Vec::new();
            for variant in self.initials_variants(initials, query.homophone) {
                set.extend_from_slice(idx.by_initials(&variant));
            }
            live.narrow("initials", sorted(set));
        }
        if let Some(chars) = &query.starts_with {
            let set = chars.iter().flat_map(|c| idx.by_first_char(*c)).copied();
            live.narrow("starts_with", sorted(set.collect()));
        }
        if let Some(chars) = &query.ends_with {
            let set = chars.iter().flat_map(|c| idx.by_last_char(*c)).copied();
            live.narrow("ends_with", sorted(set.collect()));
        }
        if let Some(chars) = &query.contains_all {
            for c in chars {
                live.narrow("contains_all", idx.by_char(*c).to_vec());
            }
        }
        if live.is_empty() {
            return Ok(Vec::new());
        }

        let mut positions = live.into_positions(idx.len());
        if let Some(pattern) = &query.pattern {
            let matcher = self.pattern_matcher(pattern, query.phonetic, query.homophone)?;
            positions.retain(|pos| idx.entry(*pos).is_some_and(|e| matcher.is_match(e)));
            tracing::debug!(predicate = "pattern", candidates = positions.len());
        }
        Ok(positions)
    }

    /// Entry whose text is exactly `text`.
    pub fn lookup(&self, text: &str) -> Option<&Entry> {
        let text = utils::normalize(text);
        let first = text.chars().next()?;
        self.index
            .by_first_char(first)
            .iter()
            .filter_map(|pos| self.index.entry(*pos))
            .find(|e| e.text() == text)
    }

    /// Entries starting with `ch`, for chaining one entry onto the last
    /// character of another.
    pub fn chain_candidates(&self, ch: char) -> Vec<&Entry> {
        let query = Query::new().starts_with(&ch.to_string());
        self.search_all(&query).unwrap_or_default()
    }

    /// Initials strings to look up for `initials`.
    ///
    /// A single `@` is expanded over the vowel-finals and each spelling is
    /// reduced to initials through the syllabifier. With `homophone`, every
    /// letter is also replaced by the first letters of its confusable
    /// initials, up to the configured length.
    pub fn initials_variants(&self, initials: &str, homophone: bool) -> Vec<String> {
        let bases: Vec<String> = if initials.contains('@') {
            let syllabifier = Syllabifier::new(&self.index, self.config.base.max_syllable_len);
            expand_final_wildcard(initials)
                .iter()
                .map(|spelled| {
                    syllabifier
                        .split(spelled)
                        .iter()
                        .flat_map(|t| {
                            // fragments contribute every letter
                            let take = if t.known { 1 } else { t.text.len() };
                            t.text.chars().take(take).collect::<Vec<_>>()
                        })
                        .collect()
                })
                .collect()
        } else {
            vec![initials.to_string()]
        };

        let mut out: Vec<String> = Vec::new();
        for base in bases {
            let expanded = if homophone && base.chars().count() <= self.config.max_initials_len {
                self.letter_products(&base)
            } else {
                vec![base]
            };
            for v in expanded {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        out
    }

    fn letter_products(&self, base: &str) -> Vec<String> {
        let mut combos = vec![String::new()];
        for letter in base.chars() {
            let alts = self.tables.initial_letter_variants(letter);
            let mut next = Vec::with_capacity(combos.len() * alts.len());
            for combo in combos.iter() {
                for alt in alts.iter() {
                    let mut c = combo.clone();
                    c.push(*alt);
                    next.push(c);
                }
            }
            combos = next;
        }
        combos
    }

    fn pattern_matcher(
        &self,
        pattern: &str,
        phonetic: bool,
        homophone: bool,
    ) -> Result<PatternMatcher, QueryError> {
        let text_source = text_pattern(pattern);
        if !phonetic {
            let text = Regex::new(&text_source).map_err(|e| invalid_pattern(pattern, None, e))?;
            return Ok(PatternMatcher {
                text: Some(text),
                plain: None,
            });
        }

        let transpiled = self.transpiler().transpile(pattern, homophone);
        let plain = RegexBuilder::new(&transpiled)
            .case_insensitive(true)
            .build()
            .map_err(|e| invalid_pattern(pattern, Some(transpiled.clone()), e))?;
        // in phonetic mode only the romanized side decides validity
        let text = match Regex::new(&text_source) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::debug!(pattern, "text-side match skipped: {e}");
                None
            }
        };
        Ok(PatternMatcher {
            text,
            plain: Some(plain),
        })
    }
}

fn invalid_pattern(pattern: &str, transpiled: Option<String>, e: regex::Error) -> QueryError {
    tracing::warn!(pattern, transpiled = ?transpiled, "invalid pattern: {e}");
    QueryError::InvalidPattern {
        pattern: pattern.to_string(),
        transpiled,
        message: e.to_string(),
    }
}

struct PatternMatcher {
    text: Option<Regex>,
    plain: Option<Regex>,
}

impl PatternMatcher {
    fn is_match(&self, entry: &Entry) -> bool {
        self.plain
            .as_ref()
            .is_some_and(|re| re.is_match(entry.romanization_plain()))
            || self
                .text
                .as_ref()
                .is_some_and(|re| re.is_match(entry.text()))
    }
}

/// Live candidate set; `None` stands for the whole corpus.
struct Candidates(Option<Vec<Position>>);

impl Candidates {
    fn all() -> Self {
        Self(None)
    }

    /// Intersect with `set`, which must be sorted and duplicate-free.
    fn narrow(&mut self, predicate: &str, set: Vec<Position>) {
        let next = match self.0.take() {
            None => set,
            Some(cur) => intersect(&cur, &set),
        };
        tracing::debug!(predicate, candidates = next.len());
        self.0 = Some(next);
    }

    fn is_empty(&self) -> bool {
        self.0.as_ref().is_some_and(Vec::is_empty)
    }

    fn into_positions(self, corpus_len: usize) -> Vec<Position> {
        self.0.unwrap_or_else(|| (0..corpus_len).collect())
    }
}

fn sorted(mut set: Vec<Position>) -> Vec<Position> {
    set.sort_unstable();
    set.dedup();
    set
}

/// Intersection of two ascending, duplicate-free position lists.
fn intersect(a: &[Position], b: &[Position]) -> Vec<Position> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
