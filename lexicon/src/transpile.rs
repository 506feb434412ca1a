//! Pattern transpiler: text-oriented patterns to syllable-level regexes.
//!
//! The output is matched against an entry's plain romanization, which has
//! one space-delimited syllable per character (`"zhong guo"`). The scanner
//! walks the pattern once and emits a flat list of units:
//!
//! - letter runs are syllabified against the index's syllable table
//! - ideographs are replaced by the first plain reading of the romanizer
//! - `.` is one syllable, and `.{m,n}` counts syllables, not letters
//! - bracket classes, escapes and other metacharacters are copied through
//!
//! Units are then rendered with a single space wherever two syllabic units
//! meet. Whole syllables are held to word boundaries, so `中国` and
//! `zhongguo` both become `\bzhong\b \bguo\b` and never match inside a
//! longer syllable. Fragments are only anchored on the left, which keeps
//! `^zh.*$` useful as a prefix search.
use once_cell::sync::Lazy;
use regex::Regex;

use lexicon_core::fuzzy::expand_final_wildcard;
use lexicon_core::{CorpusIndex, Romanizer};

use crate::config::SearchConfig;
use crate::syllabify::Syllabifier;

/// Interiors accepted as a `{...}` quantifier.
static QUANTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+|\d+,\d+|\d+,|,\d+)$").expect("static quantifier regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
    UpTo(usize),
}

impl Quantifier {
    fn parse(interior: &str) -> Option<Self> {
        if !QUANTIFIER.is_match(interior) {
            return None;
        }
        let q = match interior.split_once(',') {
            None => Quantifier::Exact(interior.parse().ok()?),
            Some(("", max)) => Quantifier::UpTo(max.parse().ok()?),
            Some((min, "")) => Quantifier::AtLeast(min.parse().ok()?),
            Some((min, max)) => Quantifier::Range(min.parse().ok()?, max.parse().ok()?),
        };
        Some(q)
    }

    /// Regex text for a quantifier copied through; `{,n}` is read as `{0,n}`.
    fn verbatim(self, written: String) -> String {
        match self {
            Quantifier::UpTo(n) => format!("{{0,{n}}}"),
            _ => written,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Unit {
    /// One or more whole syllables.
    Syllable(String),
    /// Letters that do not form a whole syllable.
    Fragment(String),
    /// Zero to `max` syllables (`None` = unbounded); rendered by context.
    Optional(Option<usize>),
    /// Group opener, including any `(?...` prefix.
    Open(String),
    Close,
    Raw(String),
}

impl Unit {
    fn starts_syllabic(&self) -> bool {
        matches!(self, Unit::Syllable(_) | Unit::Fragment(_) | Unit::Open(_))
    }

    fn ends_syllabic(&self) -> bool {
        matches!(self, Unit::Syllable(_) | Unit::Fragment(_) | Unit::Close)
    }
}

/// Converts match patterns into regexes over plain romanization.
///
/// Pure over its borrowed tables, so one value may serve concurrent queries.
#[derive(Clone, Copy)]
pub struct Transpiler<'a> {
    index: &'a CorpusIndex,
    romanizer: &'a dyn Romanizer,
    config: &'a SearchConfig,
}

impl<'a> Transpiler<'a> {
    pub fn new(
        index: &'a CorpusIndex,
        romanizer: &'a dyn Romanizer,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            index,
            romanizer,
            config,
        }
    }

    /// Transpile `pattern`; with `fuzzy`, every syllable becomes an
    /// alternation of itself and its confusable syllables.
    ///
    /// A pattern holding exactly one `@` is expanded once per vowel-final and
    /// each variant is transpiled on its own.
    pub fn transpile(&self, pattern: &str, fuzzy: bool) -> String {
        let variants = expand_final_wildcard(pattern);
        let out = if variants.len() > 1 {
            variants
                .iter()
                .map(|v| format!("(?:{})", self.transpile_one(v, fuzzy)))
                .collect::<Vec<_>>()
                .join("|")
        } else {
            self.transpile_one(pattern, fuzzy)
        };
        tracing::debug!(pattern, fuzzy, transpiled = %out, "pattern transpiled");
        out
    }

    fn transpile_one(&self, pattern: &str, fuzzy: bool) -> String {
        let units = self.scan(pattern, fuzzy);
        render(&units, &self.config.syllable_placeholder)
    }

    fn scan(&self, pattern: &str, fuzzy: bool) -> Vec<Unit> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut units = Vec::new();
        let mut run = String::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if ch.is_ascii_alphabetic() {
                run.push(ch);
                i += 1;
                continue;
            }
            self.flush_run(&mut run, fuzzy, &mut units);

            match ch {
                '[' => {
                    let end = class_end(&chars, i);
                    units.push(Unit::Raw(collect(&chars[i..end])));
                    i = end;
                }
                '\\' => {
                    let end = escape_end(&chars, i);
                    units.push(Unit::Raw(collect(&chars[i..end])));
                    i = end;
                }
                '.' => i = self.wildcard(&chars, i, &mut units),
                '{' => match quantifier_at(&chars, i) {
                    Some((q, end)) => {
                        units.push(Unit::Raw(q.verbatim(collect(&chars[i..end]))));
                        i = end;
                    }
                    None => {
                        units.push(Unit::Raw(r"\{".to_string()));
                        i += 1;
                    }
                },
                '}' => {
                    units.push(Unit::Raw(r"\}".to_string()));
                    i += 1;
                }
                '(' => {
                    let end = group_prefix_end(&chars, i);
                    let text = collect(&chars[i..end]);
                    if text.ends_with(')') {
                        // inline flags such as (?i)
                        units.push(Unit::Raw(text));
                    } else {
                        units.push(Unit::Open(text));
                    }
                    i = end;
                }
                ')' => {
                    units.push(Unit::Close);
                    i += 1;
                }
                '^' | '$' | '*' | '+' | '?' | '|' => {
                    units.push(Unit::Raw(ch.to_string()));
                    i += 1;
                }
                // syllable separator, as in xi'an
                '\'' => i += 1,
                _ if ch.is_ascii() => {
                    units.push(Unit::Raw(regex::escape(&ch.to_string())));
                    i += 1;
                }
                _ => {
                    units.push(self.ideograph(ch, fuzzy));
                    i += 1;
                }
            }
        }
        self.flush_run(&mut run, fuzzy, &mut units);
        units
    }

    fn flush_run(&self, run: &mut String, fuzzy: bool, units: &mut Vec<Unit>) {
        if run.is_empty() {
            return;
        }
        let syllabifier = Syllabifier::new(self.index, self.config.base.max_syllable_len);
        let mut fragment = String::new();
        for token in syllabifier.split(run) {
            if token.known {
                if !fragment.is_empty() {
                    units.push(Unit::Fragment(regex::escape(&fragment)));
                    fragment.clear();
                }
                units.push(Unit::Syllable(self.syllable(&token.text, fuzzy)));
            } else {
                fragment.push_str(&token.text);
            }
        }
        if !fragment.is_empty() {
            units.push(Unit::Fragment(regex::escape(&fragment)));
        }
        run.clear();
    }

    fn ideograph(&self, ch: char, fuzzy: bool) -> Unit {
        match self.romanizer.first_plain(ch) {
            Some(plain) if !plain.is_empty() => Unit::Syllable(self.syllable(&plain, fuzzy)),
            _ => Unit::Raw(regex::escape(&ch.to_string())),
        }
    }

    fn syllable(&self, syllable: &str, fuzzy: bool) -> String {
        let escaped = regex::escape(syllable);
        if !fuzzy {
            return escaped;
        }
        match self.index.similar_to(syllable) {
            Some(similar) if !similar.is_empty() => {
                let mut alts = vec![escaped];
                alts.extend(similar.iter().map(|s| regex::escape(s)));
                format!("(?:{})", alts.join("|"))
            }
            _ => escaped,
        }
    }

    /// Handle the `.` at `i`, returning the index after everything consumed.
    fn wildcard(&self, chars: &[char], i: usize, units: &mut Vec<Unit>) -> usize {
        let ph = self.config.syllable_placeholder.as_str();
        match chars.get(i + 1) {
            // character-level repetition, left to the regex engine
            Some('*' | '+' | '?') => {
                units.push(Unit::Raw(".".to_string()));
                i + 1
            }
            Some('{') => match quantifier_at(chars, i + 1) {
                Some((q, end)) => {
                    let verbatim = collect(&chars[i..end]);
                    if let Some(unit) = repeat_syllables(q, ph, verbatim) {
                        units.push(unit);
                    }
                    end
                }
                None => {
                    units.push(Unit::Syllable(ph.to_string()));
                    i + 1
                }
            },
            _ => {
                units.push(Unit::Syllable(ph.to_string()));
                i + 1
            }
        }
    }
}

/// Syllable-counting expansion of `.{...}`. `None` means nothing to emit.
fn repeat_syllables(q: Quantifier, ph: &str, verbatim: String) -> Option<Unit> {
    let mandatory = |m: usize| vec![ph; m].join(" ");
    let unit = match q {
        Quantifier::Exact(0) | Quantifier::Range(0, 0) => return None,
        Quantifier::Exact(m) => Unit::Syllable(mandatory(m)),
        // the regex engine rejects min > max; surface that instead of guessing
        Quantifier::Range(m, n) if m > n => Unit::Raw(verbatim),
        Quantifier::Range(0, n) => Unit::Optional(Some(n)),
        Quantifier::Range(m, n) if m == n => Unit::Syllable(mandatory(m)),
        Quantifier::Range(m, n) => {
            Unit::Syllable(format!("{}(?: {ph}){{0,{}}}", mandatory(m), n - m))
        }
        Quantifier::AtLeast(0) => Unit::Optional(None),
        Quantifier::AtLeast(m) => Unit::Syllable(format!("{}(?: {ph})*", mandatory(m))),
        Quantifier::UpTo(n) => Unit::Raw(format!(".{{0,{n}}}")),
    };
    Some(unit)
}

fn render(units: &[Unit], ph: &str) -> String {
    let mut out = String::new();
    let mut prev_syllabic = false;

    for (k, unit) in units.iter().enumerate() {
        let (text, starts, ends) = match unit {
            Unit::Optional(max) => {
                let next_syllabic = units.get(k + 1).is_some_and(Unit::starts_syllabic);
                let text = if prev_syllabic {
                    // glued to the syllable before it
                    match max {
                        Some(n) => format!("(?: {ph}){{0,{n}}}"),
                        None => format!("(?: {ph})*"),
                    }
                } else if next_syllabic {
                    // carries its own trailing space
                    match max {
                        Some(n) => format!("(?:{ph} ){{0,{n}}}"),
                        None => format!("(?:{ph} )*"),
                    }
                } else {
                    match max {
                        Some(1) => format!("(?:{ph})?"),
                        Some(n) => format!("(?:{ph}(?: {ph}){{0,{}}})?", n - 1),
                        None => format!("(?:{ph}(?: {ph})*)?"),
                    }
                };
                (text, false, prev_syllabic)
            }
            Unit::Syllable(s) if quantified(units.get(k + 1)) => {
                // the quantifier binds to the last letter, as written
                (format!(r"\b{s}"), true, true)
            }
            Unit::Syllable(s) => (format!(r"\b{s}\b"), true, true),
            Unit::Fragment(s) => (format!(r"\b{s}"), true, true),
            Unit::Open(s) | Unit::Raw(s) => {
                (s.clone(), unit.starts_syllabic(), unit.ends_syllabic())
            }
            Unit::Close => (")".to_string(), false, true),
        };

        if prev_syllabic && starts {
            out.push(' ');
        }
        out.push_str(&text);
        prev_syllabic = ends;
    }
    out
}

fn quantified(next: Option<&Unit>) -> bool {
    match next {
        Some(Unit::Raw(t)) => t.starts_with(['*', '+', '?', '{']),
        _ => false,
    }
}

/// `pattern` prepared for matching against entry text: braces that do not
/// form a quantifier are literal and `{,n}` is read as `{0,n}`, the same
/// way the transpiler treats them.
///
/// ```
/// use lexicon::transpile::text_pattern;
///
/// assert_eq!(text_pattern("中{"), r"中\{");
/// assert_eq!(text_pattern(".{,3}"), ".{0,3}");
/// assert_eq!(text_pattern(r"\p{Han}{2}"), r"\p{Han}{2}");
/// ```
pub fn text_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        let end = match chars[i] {
            '[' => class_end(&chars, i),
            '\\' => escape_end(&chars, i),
            '{' => {
                match quantifier_at(&chars, i) {
                    Some((q, end)) => {
                        out.push_str(&q.verbatim(collect(&chars[i..end])));
                        i = end;
                    }
                    None => {
                        out.push_str(r"\{");
                        i += 1;
                    }
                }
                continue;
            }
            '}' => {
                out.push_str(r"\}");
                i += 1;
                continue;
            }
            _ => i + 1,
        };
        out.extend(&chars[i..end]);
        i = end;
    }
    out
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// A valid quantifier starting at the `{` at `open`, and the index after its
/// closing brace.
fn quantifier_at(chars: &[char], open: usize) -> Option<(Quantifier, usize)> {
    let close = chars[open + 1..].iter().position(|c| *c == '}')? + open + 1;
    let interior = collect(&chars[open + 1..close]);
    Quantifier::parse(&interior).map(|q| (q, close + 1))
}

/// End (exclusive) of the bracket class opened at `open`, honouring nested
/// classes, escapes and a leading literal `]`. Unterminated classes run to
/// the end of the pattern.
fn class_end(chars: &[char], open: usize) -> usize {
    let mut j = open + 1;
    if chars.get(j) == Some(&'^') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    let mut depth = 1usize;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return j + 1;
                }
            }
            _ => {}
        }
        j += 1;
    }
    chars.len()
}

/// End (exclusive) of the escape sequence starting at the `\` at `at`.
fn escape_end(chars: &[char], at: usize) -> usize {
    let len = chars.len();
    let Some(&kind) = chars.get(at + 1) else {
        return len;
    };
    let braced = chars.get(at + 2) == Some(&'{');
    let end = match kind {
        'p' | 'P' | 'x' | 'u' | 'U' if braced => chars[at + 3..]
            .iter()
            .position(|c| *c == '}')
            .map_or(len, |p| at + 3 + p + 1),
        'p' | 'P' => at + 3,
        'x' => at + 4,
        'u' => at + 6,
        'U' => at + 10,
        _ => at + 2,
    };
    end.min(len)
}

/// End (exclusive) of a group opener: `(` alone, or `(?` up to and including
/// the `:`, `>` or `)` that finishes its prefix.
fn group_prefix_end(chars: &[char], open: usize) -> usize {
    if chars.get(open + 1) != Some(&'?') {
        return open + 1;
    }
    let mut j = open + 2;
    while j < chars.len() {
        let c = chars[j];
        j += 1;
        if matches!(c, ':' | '>' | ')') {
            break;
        }
    }
    j
}
