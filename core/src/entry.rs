//! One lexical item and its precomputed attributes.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::romanize::Romanizer;
use crate::structure::{self, StructureTag};
use crate::utils;

/// Corpus origin of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Fixed four-character phrase (成语).
    Idiom,
    /// Compound word (词语).
    Word,
    /// Riddle-answer pair (歇后语); the riddle is the entry text.
    Riddle,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Idiom, Category::Word, Category::Riddle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Idiom => "idiom",
            Category::Word => "word",
            Category::Riddle => "riddle",
        }
    }

    pub fn label_zh(&self) -> &'static str {
        match self {
            Category::Idiom => "成语",
            Category::Word => "词语",
            Category::Riddle => "歇后语",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.label_zh() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// A lexical entry. Immutable once constructed; every derived attribute is
/// computed by [`Entry::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    text: String,
    chars: Vec<char>,
    romanization: String,
    romanization_plain: String,
    syllables: Vec<String>,
    initials: String,
    tones: String,
    rhyme: String,
    category: Category,
    structure: Option<StructureTag>,
    definition: Option<String>,
    source: Option<String>,
    example: Option<String>,
}

impl Entry {
    /// Build an entry from its text, deriving pronunciation attributes from
    /// the first reading of each character.
    ///
    /// ```
    /// use lexicon_core::{Category, Entry, TableRomanizer};
    ///
    /// let r = TableRomanizer::new().with('中', &["zhōng"]).with('国', &["guó"]);
    /// let e = Entry::new("中国", Category::Word, &r).unwrap();
    /// assert_eq!(e.romanization_plain(), "zhong guo");
    /// assert_eq!(e.initials(), "zg");
    /// assert_eq!(e.rhyme(), "uo");
    /// ```
    pub fn new(
        text: &str,
        category: Category,
        romanizer: &dyn Romanizer,
    ) -> Result<Self, EntryError> {
        let text = utils::normalize(text);
        if text.is_empty() {
            return Err(EntryError::EmptyText);
        }
        let chars: Vec<char> = text.chars().collect();
        let r = romanizer.romanize(&text);
        let structure = structure::classify(&chars);

        Ok(Self {
            text,
            chars,
            romanization: r.toned,
            romanization_plain: r.plain,
            syllables: r.syllables,
            initials: r.initials,
            tones: r.tones,
            rhyme: r.rhyme,
            category,
            structure,
            definition: None,
            source: None,
            example: None,
        })
    }

    /// Attach a definition; runs of whitespace collapse to single spaces.
    pub fn with_definition(mut self, definition: &str) -> Self {
        self.definition = non_empty(&definition.split_whitespace().collect::<Vec<_>>().join(" "));
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = non_empty(source);
        self
    }

    pub fn with_example(mut self, example: &str) -> Self {
        self.example = non_empty(example);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn first_char(&self) -> char {
        self.chars[0]
    }

    pub fn last_char(&self) -> char {
        self.chars[self.chars.len() - 1]
    }

    /// Toned pronunciation, space-delimited.
    pub fn romanization(&self) -> &str {
        &self.romanization
    }

    /// Plain pronunciation, space-delimited, one syllable per character.
    pub fn romanization_plain(&self) -> &str {
        &self.romanization_plain
    }

    pub fn initials(&self) -> &str {
        &self.initials
    }

    /// Comma-delimited tone digits.
    pub fn tones(&self) -> &str {
        &self.tones
    }

    pub fn rhyme(&self) -> &str {
        &self.rhyme
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn structure(&self) -> Option<StructureTag> {
        self.structure
    }

    pub fn length(&self) -> usize {
        self.chars.len()
    }

    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// Plain syllables, one per character.
    pub fn syllables(&self) -> impl Iterator<Item = &str> {
        self.syllables.iter().map(String::as_str)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
