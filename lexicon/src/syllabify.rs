// Greedy syllabifier for pinyin typed directly into a pattern.
//
// - A run that is itself a known syllable is kept whole.
// - Otherwise the longest known syllable (bounded by the configured window)
//   is taken at each position.
// - A tail that is a proper prefix of some syllable ("zh", "zhon") is kept as
//   one fragment so it can still match the start of a full syllable.
// - Letters no syllable explains fall back to single-letter fragments.

use lexicon_core::CorpusIndex;

/// One piece of a syllabified run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,

    /// True for complete known syllables, false for fragments.
    pub known: bool,
}

impl Token {
    pub fn syllable<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            known: true,
        }
    }

    pub fn fragment<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            known: false,
        }
    }
}

/// Splits letter runs against the syllable table of a corpus index.
#[derive(Debug, Clone, Copy)]
pub struct Syllabifier<'a> {
    index: &'a CorpusIndex,
    max_len: usize,
}

impl<'a> Syllabifier<'a> {
    pub fn new(index: &'a CorpusIndex, max_len: usize) -> Self {
        Self {
            index,
            max_len: max_len.max(1),
        }
    }

    /// Split `run` (case-insensitive) into tokens.
    pub fn split(&self, run: &str) -> Vec<Token> {
        let lower = run.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return Vec::new();
        }
        if self.index.is_known_syllable(&lower) {
            return vec![Token::syllable(lower)];
        }

        let chars: Vec<char> = lower.chars().collect();
        let mut out = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let rest: String = chars[i..].iter().collect();
            if !self.index.is_known_syllable(&rest) && self.index.is_syllable_prefix(&rest) {
                out.push(Token::fragment(rest));
                break;
            }
            match self.index.longest_syllable_at(&chars, i, self.max_len) {
                Some((end, syllable)) => {
                    out.push(Token::syllable(syllable));
                    i = end;
                }
                None => {
                    out.push(Token::fragment(chars[i].to_string()));
                    i += 1;
                }
            }
        }
        out
    }

    /// Texts of [`Self::split`], for callers that only need the pieces.
    pub fn split_texts(&self, run: &str) -> Vec<String> {
        self.split(run).into_iter().map(|t| t.text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_core::{Category, Entry, TableRomanizer};

    fn index() -> CorpusIndex {
        let r = TableRomanizer::new()
            .with('中', &["zhōng"])
            .with('国', &["guó"])
            .with('西', &["xī"])
            .with('安', &["ān"])
            .with('先', &["xiān"]);
        let entries = ["中国", "西安", "先"]
            .iter()
            .map(|t| Entry::new(t, Category::Word, &r).unwrap())
            .collect();
        CorpusIndex::build(entries)
    }

    #[test]
    fn whole_run_is_kept() {
        let idx = index();
        let s = Syllabifier::new(&idx, 6);
        assert_eq!(s.split("xian"), vec![Token::syllable("xian")]);
    }

    #[test]
    fn greedy_longest_match() {
        let idx = index();
        let s = Syllabifier::new(&idx, 6);
        assert_eq!(s.split_texts("ZhongGuo"), vec!["zhong", "guo"]);
        assert_eq!(s.split_texts("xianan"), vec!["xian", "an"]);
    }

    #[test]
    fn prefix_tail_is_one_fragment() {
        let idx = index();
        let s = Syllabifier::new(&idx, 6);
        assert_eq!(s.split("zh"), vec![Token::fragment("zh")]);
        assert_eq!(
            s.split("zhongg"),
            vec![Token::syllable("zhong"), Token::fragment("g")]
        );
    }

    #[test]
    fn unknown_letters_fall_back_to_single_fragments() {
        let idx = index();
        let s = Syllabifier::new(&idx, 6);
        assert_eq!(
            s.split("qqan"),
            vec![Token::fragment("q"), Token::fragment("q"), Token::syllable("an")]
        );
    }
}
