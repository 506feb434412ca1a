//! Corpus index: an entry arena plus inverted maps from lookup keys to
//! entry positions.
//!
//! The index is built in one pass and is immutable afterwards, so a single
//! value can be shared by reference (or `Arc`) between any number of
//! concurrent readers. Every positions list is strictly ascending and free of
//! duplicates.
use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::entry::{Category, Entry};
use crate::fuzzy::SimilarityTables;
use crate::structure::StructureTag;
use crate::trie::TrieNode;
use crate::utils;

/// Dense position of an entry in the index arena.
pub type Position = usize;

/// Character occurrence counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharFrequency {
    counts: AHashMap<char, usize>,
}

impl CharFrequency {
    fn add(&mut self, ch: char) {
        *self.counts.entry(ch).or_insert(0) += 1;
    }

    pub fn get(&self, ch: char) -> usize {
        self.counts.get(&ch).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Characters by descending count, ties broken by code point. A `limit`
    /// of 0 returns everything.
    pub fn most_common(&self, limit: usize) -> Vec<(char, usize)> {
        let mut all: Vec<(char, usize)> = self.counts.iter().map(|(c, n)| (*c, *n)).collect();
        all.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        if limit > 0 {
            all.truncate(limit);
        }
        all
    }
}

/// Which frequency counter to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyPosition {
    Start,
    End,
    All,
}

/// Multi-key inverted index over an entry arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusIndex {
    entries: Vec<Entry>,

    by_first_char: AHashMap<char, Vec<Position>>,
    by_last_char: AHashMap<char, Vec<Position>>,
    by_char: AHashMap<char, Vec<Position>>,
    by_initials: AHashMap<String, Vec<Position>>,
    by_plain: AHashMap<String, Vec<Position>>,
    by_rhyme: AHashMap<String, Vec<Position>>,
    by_tones: AHashMap<String, Vec<Position>>,
    by_length: AHashMap<usize, Vec<Position>>,
    by_category: AHashMap<Category, Vec<Position>>,
    by_structure: AHashMap<StructureTag, Vec<Position>>,

    /// syllable -> characters pronounced that way
    chars_by_syllable: AHashMap<String, BTreeSet<char>>,
    /// syllable -> confusable syllables
    similar_syllables: AHashMap<String, BTreeSet<String>>,

    freq_start: CharFrequency,
    freq_end: CharFrequency,
    freq_all: CharFrequency,

    #[serde(skip)]
    syllable_trie: TrieNode,
}

fn register<K: std::hash::Hash + Eq>(map: &mut AHashMap<K, Vec<Position>>, key: K, pos: Position) {
    let list = map.entry(key).or_default();
    if list.last() != Some(&pos) {
        list.push(pos);
    }
}

impl CorpusIndex {
    /// Build the index with the default similarity tables.
    pub fn build(entries: Vec<Entry>) -> Self {
        Self::build_with(entries, &SimilarityTables::default())
    }

    /// Build the index in a single pass over `entries`.
    pub fn build_with(entries: Vec<Entry>, tables: &SimilarityTables) -> Self {
        let mut idx = Self {
            entries: Vec::new(),
            by_first_char: AHashMap::new(),
            by_last_char: AHashMap::new(),
            by_char: AHashMap::new(),
            by_initials: AHashMap::new(),
            by_plain: AHashMap::new(),
            by_rhyme: AHashMap::new(),
            by_tones: AHashMap::new(),
            by_length: AHashMap::new(),
            by_category: AHashMap::new(),
            by_structure: AHashMap::new(),
            chars_by_syllable: AHashMap::new(),
            similar_syllables: AHashMap::new(),
            freq_start: CharFrequency::default(),
            freq_end: CharFrequency::default(),
            freq_all: CharFrequency::default(),
            syllable_trie: TrieNode::new(),
        };

        for (pos, entry) in entries.iter().enumerate() {
            register(&mut idx.by_first_char, entry.first_char(), pos);
            idx.freq_start.add(entry.first_char());
            register(&mut idx.by_last_char, entry.last_char(), pos);
            idx.freq_end.add(entry.last_char());

            for (ch, syllable) in entry.chars().iter().zip(entry.syllables()) {
                register(&mut idx.by_char, *ch, pos);
                idx.freq_all.add(*ch);

                if utils::is_cjk(*ch) {
                    idx.chars_by_syllable
                        .entry(syllable.to_string())
                        .or_default()
                        .insert(*ch);
                }
            }

            register(&mut idx.by_initials, entry.initials().to_string(), pos);
            register(&mut idx.by_plain, entry.romanization_plain().to_string(), pos);
            register(&mut idx.by_rhyme, entry.rhyme().to_string(), pos);
            register(&mut idx.by_tones, entry.tones().to_string(), pos);
            register(&mut idx.by_length, entry.length(), pos);
            register(&mut idx.by_category, entry.category(), pos);
            if let Some(tag) = entry.structure() {
                register(&mut idx.by_structure, tag, pos);
            }
        }

        // Similarity is resolved once per distinct syllable, not per query.
        for syllable in idx.chars_by_syllable.keys() {
            let similar = tables.similar_syllables(syllable);
            if !similar.is_empty() {
                idx.similar_syllables
                    .insert(syllable.clone(), similar.into_iter().collect());
            }
        }

        idx.entries = entries;
        idx.rebuild_syllable_trie();

        tracing::info!(
            entries = idx.entries.len(),
            syllables = idx.chars_by_syllable.len(),
            "corpus index built"
        );
        idx
    }

    /// Drop entries with empty text, then build.
    pub fn from_entries_filtered(entries: Vec<Entry>, tables: &SimilarityTables) -> Self {
        let before = entries.len();
        let kept: Vec<Entry> = entries
            .into_iter()
            .filter(|e| !e.text().trim().is_empty())
            .collect();
        if kept.len() != before {
            tracing::warn!(dropped = before - kept.len(), "skipped entries with empty text");
        }
        Self::build_with(kept, tables)
    }

    /// Restore the syllable trie, which is derived data and not serialized.
    pub(crate) fn rebuild_syllable_trie(&mut self) {
        let mut trie = TrieNode::new();
        for syllable in self.chars_by_syllable.keys() {
            trie.insert(syllable);
        }
        self.syllable_trie = trie;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, pos: Position) -> Option<&Entry> {
        self.entries.get(pos)
    }

    pub fn by_first_char(&self, ch: char) -> &[Position] {
        self.by_first_char.get(&ch).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_last_char(&self, ch: char) -> &[Position] {
        self.by_last_char.get(&ch).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_char(&self, ch: char) -> &[Position] {
        self.by_char.get(&ch).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_initials(&self, initials: &str) -> &[Position] {
        self.by_initials.get(initials).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_plain(&self, plain: &str) -> &[Position] {
        self.by_plain.get(plain).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_rhyme(&self, rhyme: &str) -> &[Position] {
        self.by_rhyme.get(rhyme).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_tones(&self, tones: &str) -> &[Position] {
        self.by_tones.get(tones).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_length(&self, length: usize) -> &[Position] {
        self.by_length.get(&length).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_category(&self, category: Category) -> &[Position] {
        self.by_category.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_structure(&self, tag: StructureTag) -> &[Position] {
        self.by_structure.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Characters in the corpus pronounced `syllable`.
    pub fn chars_for_syllable(&self, syllable: &str) -> Option<&BTreeSet<char>> {
        self.chars_by_syllable.get(syllable)
    }

    /// Confusable syllables registered for `syllable` at build time.
    pub fn similar_to(&self, syllable: &str) -> Option<&BTreeSet<String>> {
        self.similar_syllables.get(syllable)
    }

    pub fn is_known_syllable(&self, syllable: &str) -> bool {
        self.chars_by_syllable.contains_key(syllable)
    }

    /// Whether `prefix` begins some known syllable.
    pub fn is_syllable_prefix(&self, prefix: &str) -> bool {
        self.syllable_trie.has_prefix(prefix)
    }

    pub fn syllable_count(&self) -> usize {
        self.chars_by_syllable.len()
    }

    /// Longest known syllable of at most `max_len` letters starting at `pos`.
    pub fn longest_syllable_at(
        &self,
        input: &[char],
        pos: usize,
        max_len: usize,
    ) -> Option<(usize, &str)> {
        self.syllable_trie.longest_prefix(input, pos, max_len)
    }

    pub fn frequency(&self, position: FrequencyPosition) -> &CharFrequency {
        match position {
            FrequencyPosition::Start => &self.freq_start,
            FrequencyPosition::End => &self.freq_end,
            FrequencyPosition::All => &self.freq_all,
        }
    }

    /// Entry count per category, in category order.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.by_category(*c).len()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableRomanizer;

    fn corpus() -> CorpusIndex {
        let r = TableRomanizer::new()
            .with('中', &["zhōng"])
            .with('国', &["guó"])
            .with('人', &["rén"])
            .with('哈', &["hā"])
            .with('钟', &["zhōng"]);
        let entries = vec![
            Entry::new("中国", Category::Word, &r).unwrap(),
            Entry::new("中国人", Category::Word, &r).unwrap(),
            Entry::new("哈哈哈哈", Category::Idiom, &r).unwrap(),
            Entry::new("钟", Category::Word, &r).unwrap(),
        ];
        CorpusIndex::build(entries)
    }

    #[test]
    fn registers_every_key() {
        let idx = corpus();
        assert_eq!(idx.len(), 4);
        assert_eq!(idx.by_first_char('中'), &[0, 1]);
        assert_eq!(idx.by_last_char('国'), &[0]);
        assert_eq!(idx.by_char('国'), &[0, 1]);
        assert_eq!(idx.by_initials("zg"), &[0]);
        assert_eq!(idx.by_plain("zhong guo ren"), &[1]);
        assert_eq!(idx.by_rhyme("uo"), &[0]);
        assert_eq!(idx.by_tones("1,2,2"), &[1]);
        assert_eq!(idx.by_length(2), &[0]);
        assert_eq!(idx.by_category(Category::Idiom), &[2]);
        assert_eq!(idx.by_structure(StructureTag::Aabb), &[2]);
        assert!(idx.by_char('x').is_empty());
    }

    #[test]
    fn repeated_chars_register_once() {
        let idx = corpus();
        assert_eq!(idx.by_char('哈'), &[2]);
        assert_eq!(idx.frequency(FrequencyPosition::All).get('哈'), 4);
    }

    #[test]
    fn syllable_tables() {
        let idx = corpus();
        let chars: Vec<char> = idx.chars_for_syllable("zhong").unwrap().iter().copied().collect();
        assert_eq!(chars, vec!['中', '钟']);
        assert!(idx.similar_to("zhong").unwrap().contains("zong"));
        assert!(idx.is_known_syllable("ren"));
        assert!(!idx.is_known_syllable("xyz"));
        assert!(idx.is_syllable_prefix("zho"));
        assert!(!idx.is_syllable_prefix("zhg"));

        let input: Vec<char> = "zhongguo".chars().collect();
        assert_eq!(idx.longest_syllable_at(&input, 0, 6), Some((5, "zhong")));
    }

    #[test]
    fn frequency_counters() {
        let idx = corpus();
        let start = idx.frequency(FrequencyPosition::Start).most_common(1);
        assert_eq!(start, vec![('中', 2)]);
        assert_eq!(idx.frequency(FrequencyPosition::End).get('国'), 1);
        assert_eq!(
            idx.category_counts(),
            vec![(Category::Idiom, 1), (Category::Word, 3)]
        );
    }
}
