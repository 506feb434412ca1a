//! Four-character structural templates.
//!
//! Templates are evaluated in a fixed priority order and the first match
//! wins. Each template only constrains which positions are equal, so a word
//! of four identical characters satisfies every template and is always
//! tagged [`StructureTag::Aabb`].
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructureTag {
    #[serde(rename = "AABB")]
    Aabb,
    #[serde(rename = "ABAB")]
    Abab,
    #[serde(rename = "ABAC")]
    Abac,
    #[serde(rename = "ABCC")]
    Abcc,
    #[serde(rename = "AABC")]
    Aabc,
    #[serde(rename = "ABCB")]
    Abcb,
}

impl StructureTag {
    /// Templates in priority order.
    pub const ALL: [StructureTag; 6] = [
        StructureTag::Aabb,
        StructureTag::Abab,
        StructureTag::Abac,
        StructureTag::Abcc,
        StructureTag::Aabc,
        StructureTag::Abcb,
    ];

    /// Whether a four-character word fits this template.
    pub fn matches(&self, c: &[char; 4]) -> bool {
        match self {
            StructureTag::Aabb => c[0] == c[1] && c[2] == c[3],
            StructureTag::Abab => c[0] == c[2] && c[1] == c[3],
            StructureTag::Abac => c[0] == c[2],
            StructureTag::Abcc => c[2] == c[3],
            StructureTag::Aabc => c[0] == c[1],
            StructureTag::Abcb => c[1] == c[3],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StructureTag::Aabb => "AABB",
            StructureTag::Abab => "ABAB",
            StructureTag::Abac => "ABAC",
            StructureTag::Abcc => "ABCC",
            StructureTag::Aabc => "AABC",
            StructureTag::Abcb => "ABCB",
        }
    }
}

impl fmt::Display for StructureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StructureTag::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown structure template: {s}"))
    }
}

/// Classify a word; only words of exactly four characters get a tag.
///
/// ```
/// use lexicon_core::structure::{classify, StructureTag};
///
/// assert_eq!(classify(&['高', '高', '兴', '兴']), Some(StructureTag::Aabb));
/// assert_eq!(classify(&['一', '心', '一', '意']), Some(StructureTag::Abac));
/// assert_eq!(classify(&['中', '国']), None);
/// ```
pub fn classify(chars: &[char]) -> Option<StructureTag> {
    let word: &[char; 4] = chars.try_into().ok()?;
    StructureTag::ALL.into_iter().find(|t| t.matches(word))
}
