/// Prefix trie over plain syllables.
use std::collections::HashMap;

/// A prefix tree of known syllables.
///
/// Built from the corpus index's syllable table and used for greedy
/// longest-match syllabification of pinyin typed directly into a pattern.
///
/// # Example
/// ```
/// use lexicon_core::trie::TrieNode;
///
/// let mut trie = TrieNode::new();
/// trie.insert("zhong");
/// trie.insert("guo");
///
/// let input: Vec<char> = "zhongguo".chars().collect();
/// assert_eq!(trie.longest_prefix(&input, 0, 6), Some((5, "zhong")));
/// assert_eq!(trie.longest_prefix(&input, 5, 6), Some((8, "guo")));
/// ```
#[derive(Debug, Default, Clone)]
pub struct TrieNode {
    children: HashMap<char, Box<TrieNode>>,
    /// Set on nodes that terminate a syllable.
    word: Option<String>,
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a syllable.
    pub fn insert(&mut self, syllable: &str) {
        let mut node = self;
        for ch in syllable.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.word = Some(syllable.to_string());
    }

    /// True only for complete syllables, not bare prefixes.
    pub fn contains_word(&self, word: &str) -> bool {
        let mut node = self;
        for ch in word.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.word.is_some()
    }

    /// True when `prefix` begins at least one syllable (including a whole
    /// syllable).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let mut node = self;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// All syllables that start at `start`, shortest first, as
    /// `(end_index, syllable)` with `end_index` exclusive.
    pub fn walk_prefixes(&self, input: &[char], start: usize) -> Vec<(usize, &str)> {
        let mut res = Vec::new();
        let mut node = self;
        let mut idx = start;
        while idx < input.len() {
            match node.children.get(&input[idx]) {
                Some(child) => {
                    node = child;
                    idx += 1;
                    if let Some(w) = &node.word {
                        res.push((idx, w.as_str()));
                    }
                }
                None => break,
            }
        }
        res
    }

    /// Longest syllable of at most `max_len` characters starting at `start`.
    pub fn longest_prefix(
        &self,
        input: &[char],
        start: usize,
        max_len: usize,
    ) -> Option<(usize, &str)> {
        self.walk_prefixes(input, start)
            .into_iter()
            .filter(|(end, _)| end - start <= max_len)
            .last()
    }
}
