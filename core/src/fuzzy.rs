//! Phonological similarity tables.
//!
//! Two [`FuzzyMap`]s, one over initial consonants and one over vowel-finals,
//! drive homophone expansion. Tables are written as rule strings:
//!
//! - `"zh=z"` inserts both directions
//! - `"an>ang"` inserts only `an -> ang`
//!
//! The default tables are one-directional and list alternatives in the
//! order they are written.
use std::collections::BTreeSet;

use ahash::AHashMap;

/// Initial consonants, longest first where prefixes collide.
pub const INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r",
    "z", "c", "s", "y", "w",
];

/// Vowel-final inventory substituted for the `@` wildcard.
pub const VOWEL_FINALS: &[&str] = &[
    "a", "ai", "an", "ang", "ao", "e", "ei", "en", "eng", "er", "i", "ia", "ian", "iang", "iao",
    "ie", "in", "ing", "iong", "iu", "o", "ong", "ou", "u", "ua", "uai", "uan", "uang", "ui",
    "un", "uo", "v", "ve", "van", "vn",
];

/// Default confusable initials.
pub fn default_initial_rules() -> Vec<String> {
    [
        "zh>z", "z>zh", "ch>c", "sh>s", "c>ch", "s>sh", "n>l", "l>n", "f>h", "h>f",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Default confusable finals.
pub fn default_final_rules() -> Vec<String> {
    [
        "an>ang", "an>en",
        "ang>an", "ang>eng",
        "en>an", "en>eng", "en>in",
        "eng>ang", "eng>en", "eng>ing",
        "in>ing", "in>en",
        "ing>in", "ing>eng",
        "ian>iang", "ian>uan", "ian>yan",
        "iang>ian", "iang>uang", "iang>yang",
        "uan>uang", "uan>ian", "uan>wan",
        "uang>uan", "uang>iang", "uang>wang",
        "ao>ou", "ou>ao",
        "ai>ei", "ei>ai",
        "ui>ei", "ui>ue",
        "ue>ui", "ue>ie",
        "ie>ue", "ie>ei",
        "uo>ou", "uo>o",
        "o>uo", "o>ou",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Ordered alternatives for phonetic units.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMap {
    map: AHashMap<String, Vec<String>>,
}

impl FuzzyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `FuzzyMap` from rule strings (`"a=b"` or `"a>b"`).
    ///
    /// Malformed rules and rules with an empty side are skipped.
    pub fn from_rules(rules: &[String]) -> Self {
        let mut fm = FuzzyMap::new();
        for rule in rules.iter() {
            if let Some((a, b)) = rule.split_once('>') {
                let (a, b) = (a.trim(), b.trim());
                if !a.is_empty() && !b.is_empty() {
                    fm.add_rule_unidirectional(a, b);
                }
            } else if let Some((a, b)) = rule.split_once('=') {
                let (a, b) = (a.trim(), b.trim());
                if !a.is_empty() && !b.is_empty() {
                    fm.add_rule(a, b);
                }
            }
        }
        fm
    }

    /// Add a rule in both directions.
    pub fn add_rule(&mut self, from: &str, to: &str) {
        self.add_rule_unidirectional(from, to);
        self.add_rule_unidirectional(to, from);
    }

    /// Add a rule `from -> to` only.
    pub fn add_rule_unidirectional(&mut self, from: &str, to: &str) {
        let alts = self.map.entry(from.to_ascii_lowercase()).or_default();
        let to = to.to_ascii_lowercase();
        if !alts.contains(&to) {
            alts.push(to);
        }
    }

    /// Registered alternatives of `unit`, excluding `unit` itself.
    pub fn alternatives(&self, unit: &str) -> &[String] {
        self.map
            .get(unit)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.map.contains_key(unit)
    }

    pub fn is_equivalent(&self, a: &str, b: &str) -> bool {
        a == b || self.alternatives(a).iter().any(|x| x == b)
    }
}

/// Split a plain syllable into (initial, final) using [`INITIALS`].
///
/// Syllables without a recognised initial return an empty initial.
pub fn split_syllable(syllable: &str) -> (&str, &str) {
    for init in INITIALS.iter() {
        if let Some(rest) = syllable.strip_prefix(init) {
            return (&syllable[..init.len()], rest);
        }
    }
    ("", syllable)
}

/// Expand a single `@` into one string per vowel-final.
///
/// Zero or several `@` leave the input unchanged.
///
/// ```
/// let v = lexicon_core::fuzzy::expand_final_wildcard("t@cai");
/// assert_eq!(v.len(), 35);
/// assert_eq!(v[0], "tacai");
/// assert_eq!(lexicon_core::fuzzy::expand_final_wildcard("a@b@c"), vec!["a@b@c"]);
/// ```
pub fn expand_final_wildcard(pattern: &str) -> Vec<String> {
    let mut parts = pattern.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(left), Some(right), None) => VOWEL_FINALS
            .iter()
            .map(|fin| format!("{left}{fin}{right}"))
            .collect(),
        _ => vec![pattern.to_string()],
    }
}

/// Confusable initials and finals.
#[derive(Debug, Clone)]
pub struct SimilarityTables {
    initials: FuzzyMap,
    finals: FuzzyMap,
}

impl Default for SimilarityTables {
    fn default() -> Self {
        Self::from_rules(&default_initial_rules(), &default_final_rules())
    }
}

impl SimilarityTables {
    pub fn from_rules(initial_rules: &[String], final_rules: &[String]) -> Self {
        Self {
            initials: FuzzyMap::from_rules(initial_rules),
            finals: FuzzyMap::from_rules(final_rules),
        }
    }

    pub fn initials(&self) -> &FuzzyMap {
        &self.initials
    }

    pub fn finals(&self) -> &FuzzyMap {
        &self.finals
    }

    /// Syllables confusable with `syllable`, sorted, excluding itself.
    ///
    /// Substitutes the initial, the final, and both at once.
    pub fn similar_syllables(&self, syllable: &str) -> Vec<String> {
        let syl = syllable.trim().to_ascii_lowercase();
        let (initial, fin) = split_syllable(&syl);
        let init_alts = self.initials.alternatives(initial);
        let mut out: BTreeSet<String> = BTreeSet::new();

        for alt in init_alts {
            out.insert(format!("{alt}{fin}"));
        }
        for fin_alt in self.finals.alternatives(fin) {
            out.insert(format!("{initial}{fin_alt}"));
            for alt in init_alts {
                out.insert(format!("{alt}{fin_alt}"));
            }
        }

        out.remove(&syl);
        out.into_iter().collect()
    }

    /// `letter` followed by the first letters of its confusable initials.
    ///
    /// Used for homophone expansion of initials strings, where only the
    /// first letter of each syllable survives.
    pub fn initial_letter_variants(&self, letter: char) -> Vec<char> {
        let mut out = vec![letter];
        let mut buf = [0u8; 4];
        for alt in self.initials.alternatives(letter.encode_utf8(&mut buf)) {
            if let Some(first) = alt.chars().next() {
                if !out.contains(&first) {
                    out.push(first);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rules_directional_and_symmetric() {
        let fm = FuzzyMap::from_rules(&["zh=z".to_string(), "an>ang".to_string(), "bad".into()]);
        assert!(fm.is_equivalent("zh", "z"));
        assert!(fm.is_equivalent("z", "zh"));
        assert!(fm.is_equivalent("an", "ang"));
        assert!(!fm.is_equivalent("ang", "an"));
        assert!(!fm.contains("bad"));
    }

    #[test]
    fn split_prefers_two_letter_initials() {
        assert_eq!(split_syllable("zhang"), ("zh", "ang"));
        assert_eq!(split_syllable("zang"), ("z", "ang"));
        assert_eq!(split_syllable("an"), ("", "an"));
        assert_eq!(split_syllable("wan"), ("w", "an"));
    }

    #[test]
    fn similar_syllables_match_reference_tables() {
        let t = SimilarityTables::default();
        assert_eq!(
            t.similar_syllables("zhang"),
            vec!["zan", "zang", "zeng", "zhan", "zheng"]
        );
        assert_eq!(t.similar_syllables("wan"), vec!["wang", "wen"]);
        assert!(t.similar_syllables("ba").is_empty());
        assert!(!t.similar_syllables("lan").contains(&"lan".to_string()));
    }

    #[test]
    fn initial_letters() {
        let t = SimilarityTables::default();
        assert_eq!(t.initial_letter_variants('n'), vec!['n', 'l']);
        assert_eq!(t.initial_letter_variants('z'), vec!['z']);
        assert_eq!(t.initial_letter_variants('b'), vec!['b']);
    }

    #[test]
    fn wildcard_expansion() {
        let v = expand_final_wildcard("tianc@");
        assert!(v.contains(&"tiancai".to_string()));
        assert_eq!(v.len(), VOWEL_FINALS.len());
        assert_eq!(expand_final_wildcard("abc"), vec!["abc"]);
    }
}
