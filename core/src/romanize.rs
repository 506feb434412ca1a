//! Romanization contract.
//!
//! The engine never computes phonetic truth itself. A [`Romanizer`] supplies
//! the readings of single characters; everything else (whole-text
//! romanization, initials, tones, rhyme, multi-reading variants) is derived
//! from those readings by the provided trait methods so every implementation
//! agrees on the derived formats:
//!
//! - toned / plain pronunciations are space-delimited, one syllable per char
//! - initials are the first letter of each plain syllable, concatenated
//! - tones are comma-delimited digits, `0` for the neutral tone
//! - the rhyme is the strict vowel-final of the last character
//!
//! Two implementations ship with the crate: [`PinyinRomanizer`] backed by the
//! `pinyin` crate's dictionary, and [`TableRomanizer`] for explicit in-memory
//! tables.
use ahash::AHashMap;
use phf::phf_map;
use pinyin::ToPinyinMulti;

/// Tone-marked vowel -> (base letter, tone).
static TONE_MARKS: phf::Map<char, (char, u8)> = phf_map! {
    'ā' => ('a', 1), 'á' => ('a', 2), 'ǎ' => ('a', 3), 'à' => ('a', 4),
    'ē' => ('e', 1), 'é' => ('e', 2), 'ě' => ('e', 3), 'è' => ('e', 4),
    'ī' => ('i', 1), 'í' => ('i', 2), 'ǐ' => ('i', 3), 'ì' => ('i', 4),
    'ō' => ('o', 1), 'ó' => ('o', 2), 'ǒ' => ('o', 3), 'ò' => ('o', 4),
    'ū' => ('u', 1), 'ú' => ('u', 2), 'ǔ' => ('u', 3), 'ù' => ('u', 4),
    'ǖ' => ('v', 1), 'ǘ' => ('v', 2), 'ǚ' => ('v', 3), 'ǜ' => ('v', 4),
    'ü' => ('v', 0),
    'ń' => ('n', 2), 'ň' => ('n', 3), 'ǹ' => ('n', 4),
    'ḿ' => ('m', 2),
};

/// Initials used when deriving the strict vowel-final (y and w are spelling
/// conventions there, not initials).
const STRICT_INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r",
    "z", "c", "s",
];

/// One pronunciation of one character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reading {
    /// Pronunciation with tone marks, e.g. `zhōng`.
    pub toned: String,
    /// Pronunciation without tone marks, `ü` written as `v`, e.g. `zhong`.
    pub plain: String,
    /// Tone class 1-4, or 0 for the neutral tone.
    pub tone: u8,
}

impl Reading {
    /// Build a reading from its tone-marked spelling.
    ///
    /// ```
    /// use lexicon_core::Reading;
    ///
    /// let r = Reading::from_toned("lǜ");
    /// assert_eq!(r.plain, "lv");
    /// assert_eq!(r.tone, 4);
    /// ```
    pub fn from_toned(toned: &str) -> Self {
        let toned = toned.trim().to_lowercase();
        let mut plain = String::with_capacity(toned.len());
        let mut tone = 0u8;
        for ch in toned.chars() {
            match TONE_MARKS.get(&ch) {
                Some(&(base, t)) => {
                    plain.push(base);
                    if tone == 0 {
                        tone = t;
                    }
                }
                None => plain.push(ch),
            }
        }
        Self { toned, plain, tone }
    }
}

/// Whole-text romanization using the first reading of every character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Romanization {
    pub toned: String,
    pub plain: String,
    /// Plain syllable of each character, in text order.
    pub syllables: Vec<String>,
    pub initials: String,
    pub tones: String,
    pub rhyme: String,
}

/// Tone digits of a space-delimited toned pronunciation, comma-delimited.
///
/// ```
/// assert_eq!(lexicon_core::romanize::tones_of("nǐ hǎo"), "3,3");
/// assert_eq!(lexicon_core::romanize::tones_of("bu yòng"), "0,4");
/// ```
pub fn tones_of(toned: &str) -> String {
    toned
        .split_whitespace()
        .map(|syl| Reading::from_toned(syl).tone.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Strict vowel-final of a plain syllable.
///
/// y/w spellings are restored to their medial form and the abbreviated
/// finals are expanded: `you -> iou`, `wei -> uei`, `yu -> v`, `ju -> v`,
/// `liu -> iou`, `dui -> uei`, `lun -> uen`.
pub fn strict_final(plain: &str) -> String {
    let s = plain.trim().to_ascii_lowercase();
    if let Some(rest) = s.strip_prefix('y') {
        return if let Some(after) = rest.strip_prefix('u') {
            format!("v{after}")
        } else if rest.starts_with('i') {
            rest.to_string()
        } else {
            format!("i{rest}")
        };
    }
    if let Some(rest) = s.strip_prefix('w') {
        return if rest == "u" {
            rest.to_string()
        } else {
            format!("u{rest}")
        };
    }

    let initial = STRICT_INITIALS
        .iter()
        .find(|init| s.starts_with(**init))
        .copied()
        .unwrap_or("");
    let mut fin = s[initial.len()..].to_string();
    if matches!(initial, "j" | "q" | "x") {
        if let Some(after) = fin.strip_prefix('u') {
            fin = format!("v{after}");
        }
    }
    match fin.as_str() {
        "iu" => "iou".to_string(),
        "ui" => "uei".to_string(),
        "un" => "uen".to_string(),
        _ => fin,
    }
}

/// Romanization Service contract.
///
/// Implementors only supply [`Romanizer::readings`]; the provided methods
/// define the derived formats.
pub trait Romanizer: Send + Sync {
    /// All readings of `ch`, most common first. Empty when the character has
    /// no pronunciation (punctuation, Latin letters, unknown glyphs).
    fn readings(&self, ch: char) -> Vec<Reading>;

    /// Plain syllable of the first reading of `ch`.
    fn first_plain(&self, ch: char) -> Option<String> {
        self.readings(ch).into_iter().next().map(|r| r.plain)
    }

    /// Strict vowel-final of the first reading of `ch`, empty if none.
    fn final_of(&self, ch: char) -> String {
        self.first_plain(ch)
            .map(|p| strict_final(&p))
            .unwrap_or_default()
    }

    /// Romanize `text` using the first reading of every character.
    ///
    /// Characters without a reading stand for themselves with tone 0, so the
    /// per-character invariants (one syllable, one initial, one tone each)
    /// hold for mixed text too.
    fn romanize(&self, text: &str) -> Romanization {
        let mut toned = Vec::new();
        let mut plain = Vec::new();
        let mut initials = String::new();
        let mut tones = Vec::new();
        let mut rhyme = String::new();

        for ch in text.chars() {
            match self.readings(ch).into_iter().next() {
                Some(r) => {
                    initials.extend(r.plain.chars().next());
                    tones.push(r.tone.to_string());
                    rhyme = strict_final(&r.plain);
                    toned.push(r.toned);
                    plain.push(r.plain);
                }
                None => {
                    initials.push(ch);
                    tones.push("0".to_string());
                    rhyme.clear();
                    toned.push(ch.to_string());
                    plain.push(ch.to_string());
                }
            }
        }

        Romanization {
            toned: toned.join(" "),
            plain: plain.join(" "),
            syllables: plain,
            initials,
            tones: tones.join(","),
            rhyme,
        }
    }

    /// Every toned pronunciation of `text` (Cartesian product over
    /// per-character readings), first-seen order, deduplicated.
    fn toned_variants(&self, text: &str) -> Vec<String> {
        self.variants(text, |r| r.toned.clone(), " ")
    }

    /// Every plain pronunciation of `text`.
    fn plain_variants(&self, text: &str) -> Vec<String> {
        self.variants(text, |r| r.plain.clone(), " ")
    }

    /// Every initials string of `text`.
    ///
    /// ```
    /// use lexicon_core::{Romanizer, TableRomanizer};
    ///
    /// let table = TableRomanizer::new()
    ///     .with('朝', &["zhāo", "cháo"])
    ///     .with('阳', &["yáng"]);
    /// assert_eq!(table.initials_variants("朝阳"), vec!["zy", "cy"]);
    /// ```
    fn initials_variants(&self, text: &str) -> Vec<String> {
        self.variants(
            text,
            |r| r.plain.chars().next().map(String::from).unwrap_or_default(),
            "",
        )
    }

    #[doc(hidden)]
    fn variants(&self, text: &str, render: fn(&Reading) -> String, sep: &str) -> Vec<String> {
        let per_char: Vec<Vec<String>> = text
            .chars()
            .map(|ch| {
                let mut alts: Vec<String> = Vec::new();
                for r in self.readings(ch).iter() {
                    let s = render(r);
                    if !alts.contains(&s) {
                        alts.push(s);
                    }
                }
                if alts.is_empty() {
                    alts.push(ch.to_string());
                }
                alts
            })
            .collect();

        let mut combos: Vec<Vec<&str>> = vec![Vec::new()];
        for alts in per_char.iter() {
            let mut next = Vec::with_capacity(combos.len() * alts.len());
            for combo in combos.iter() {
                for alt in alts.iter() {
                    let mut c = combo.clone();
                    c.push(alt.as_str());
                    next.push(c);
                }
            }
            combos = next;
        }

        let mut out: Vec<String> = Vec::new();
        for combo in combos {
            let s = combo.join(sep);
            if !out.contains(&s) {
                out.push(s);
            }
        }
        out
    }
}

/// Romanizer backed by the `pinyin` crate's character dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinRomanizer;

impl PinyinRomanizer {
    pub fn new() -> Self {
        Self
    }
}

impl Romanizer for PinyinRomanizer {
    fn readings(&self, ch: char) -> Vec<Reading> {
        let Some(multi) = ch.to_pinyin_multi() else {
            return Vec::new();
        };
        let mut out: Vec<Reading> = Vec::new();
        for p in multi {
            let r = Reading::from_toned(p.with_tone());
            if !out.contains(&r) {
                out.push(r);
            }
        }
        out
    }
}

/// Romanizer over an explicit in-memory table.
#[derive(Debug, Clone, Default)]
pub struct TableRomanizer {
    table: AHashMap<char, Vec<Reading>>,
}

impl TableRomanizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the toned readings of `ch`, most common first.
    pub fn insert(&mut self, ch: char, toned: &[&str]) {
        let readings = self.table.entry(ch).or_default();
        for t in toned {
            let r = Reading::from_toned(t);
            if !readings.contains(&r) {
                readings.push(r);
            }
        }
    }

    /// Builder form of [`TableRomanizer::insert`].
    pub fn with(mut self, ch: char, toned: &[&str]) -> Self {
        self.insert(ch, toned);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Romanizer for TableRomanizer {
    fn readings(&self, ch: char) -> Vec<Reading> {
        self.table.get(&ch).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableRomanizer {
        TableRomanizer::new()
            .with('中', &["zhōng", "zhòng"])
            .with('国', &["guó"])
            .with('朝', &["zhāo", "cháo"])
            .with('阳', &["yáng"])
            .with('的', &["de"])
    }

    #[test]
    fn reading_strips_marks() {
        let r = Reading::from_toned("zhōng");
        assert_eq!(r.plain, "zhong");
        assert_eq!(r.tone, 1);

        let r = Reading::from_toned("de");
        assert_eq!(r.plain, "de");
        assert_eq!(r.tone, 0);
    }

    #[test]
    fn strict_finals() {
        assert_eq!(strict_final("guo"), "uo");
        assert_eq!(strict_final("zhong"), "ong");
        assert_eq!(strict_final("yang"), "iang");
        assert_eq!(strict_final("you"), "iou");
        assert_eq!(strict_final("yi"), "i");
        assert_eq!(strict_final("yu"), "v");
        assert_eq!(strict_final("yuan"), "van");
        assert_eq!(strict_final("wu"), "u");
        assert_eq!(strict_final("wei"), "uei");
        assert_eq!(strict_final("ju"), "v");
        assert_eq!(strict_final("xue"), "ve");
        assert_eq!(strict_final("liu"), "iou");
        assert_eq!(strict_final("dui"), "uei");
        assert_eq!(strict_final("lun"), "uen");
        assert_eq!(strict_final("an"), "an");
        assert_eq!(strict_final("shi"), "i");
    }

    #[test]
    fn romanize_uses_first_reading() {
        let r = table().romanize("中国");
        assert_eq!(r.toned, "zhōng guó");
        assert_eq!(r.plain, "zhong guo");
        assert_eq!(r.initials, "zg");
        assert_eq!(r.tones, "1,2");
        assert_eq!(r.rhyme, "uo");
    }

    #[test]
    fn romanize_passes_unknown_chars_through() {
        let r = table().romanize("中，国");
        assert_eq!(r.plain, "zhong ， guo");
        assert_eq!(r.initials.chars().count(), 3);
        assert_eq!(r.tones, "1,0,2");
    }

    #[test]
    fn variants_are_cartesian_and_deduplicated() {
        let t = table();
        assert_eq!(t.plain_variants("朝阳"), vec!["zhao yang", "chao yang"]);
        assert_eq!(t.toned_variants("朝阳"), vec!["zhāo yáng", "cháo yáng"]);
        // 中 has two readings that share a plain spelling and an initial.
        assert_eq!(t.plain_variants("中国"), vec!["zhong guo"]);
        assert_eq!(t.initials_variants("中朝"), vec!["zz", "zc"]);
    }

    #[test]
    fn first_plain_and_final() {
        let t = table();
        assert_eq!(t.first_plain('阳').as_deref(), Some("yang"));
        assert_eq!(t.first_plain('x'), None);
        assert_eq!(t.final_of('阳'), "iang");
        assert_eq!(t.final_of('x'), "");
    }

    #[test]
    fn pinyin_adapter_reads_common_chars() {
        let r = PinyinRomanizer::new();
        assert_eq!(r.first_plain('中').as_deref(), Some("zhong"));
        assert!(r.readings('a').is_empty());
    }
}
