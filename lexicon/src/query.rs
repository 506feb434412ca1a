//! Predicate set and pagination for [`Engine::search`](crate::Engine::search).
use lexicon_core::{Category, StructureTag};

use crate::error::QueryError;

/// A sparse set of optional filters; absent filters do not constrain.
///
/// ```
/// use lexicon::Query;
/// use lexicon_core::Category;
///
/// let q = Query::new()
///     .category(Category::Idiom)
///     .initials("yxyy")
///     .homophone(true);
/// assert!(!q.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub(crate) category: Option<Category>,
    pub(crate) length: Option<usize>,
    pub(crate) rhyme: Option<String>,
    pub(crate) tones: Option<String>,
    pub(crate) structure: Option<StructureTag>,
    pub(crate) initials: Option<String>,
    pub(crate) pattern: Option<String>,
    pub(crate) phonetic: bool,
    pub(crate) homophone: bool,
    pub(crate) starts_with: Option<Vec<char>>,
    pub(crate) ends_with: Option<Vec<char>>,
    pub(crate) contains_all: Option<Vec<char>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Exact vowel-final of the last character, e.g. `"ang"`.
    pub fn rhyme(mut self, rhyme: &str) -> Self {
        self.rhyme = Some(rhyme.trim().to_ascii_lowercase());
        self
    }

    /// Exact tone sequence, e.g. `"1,2,3,4"`. Spaces are ignored.
    pub fn tones(mut self, tones: &str) -> Self {
        self.tones = Some(tones.chars().filter(|c| !c.is_whitespace()).collect());
        self
    }

    pub fn structure(mut self, tag: StructureTag) -> Self {
        self.structure = Some(tag);
        self
    }

    /// Initials string, e.g. `"zg"`. A single `@` lets one syllable be
    /// spelled with its final left open (`"zh@g"`).
    pub fn initials(mut self, initials: &str) -> Self {
        self.initials = Some(initials.trim().to_ascii_lowercase());
        self
    }

    /// Regular expression over the entry text.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    /// Also match the pattern, transpiled, against plain romanization.
    pub fn phonetic(mut self, enabled: bool) -> Self {
        self.phonetic = enabled;
        self
    }

    /// Expand initials and phonetic patterns with confusable sounds.
    pub fn homophone(mut self, enabled: bool) -> Self {
        self.homophone = enabled;
        self
    }

    /// First character is any of `chars`.
    pub fn starts_with(mut self, chars: &str) -> Self {
        self.starts_with = distinct_chars(chars);
        self
    }

    /// Last character is any of `chars`.
    pub fn ends_with(mut self, chars: &str) -> Self {
        self.ends_with = distinct_chars(chars);
        self
    }

    /// Text contains every one of `chars`.
    pub fn contains_all(mut self, chars: &str) -> Self {
        self.contains_all = distinct_chars(chars);
        self
    }

    /// True when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.length.is_none()
            && self.rhyme.is_none()
            && self.tones.is_none()
            && self.structure.is_none()
            && self.initials.is_none()
            && self.pattern.is_none()
            && self.starts_with.is_none()
            && self.ends_with.is_none()
            && self.contains_all.is_none()
    }
}

/// Distinct non-whitespace characters of `s`; `None` when there are none,
/// which leaves the filter unset.
fn distinct_chars(s: &str) -> Option<Vec<char>> {
    let mut out: Vec<char> = Vec::new();
    for ch in s.chars().filter(|c| !c.is_whitespace()) {
        if !out.contains(&ch) {
            out.push(ch);
        }
    }
    (!out.is_empty()).then_some(out)
}

/// 1-indexed page selection. A page size of 0 returns everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Result<Self, QueryError> {
        if page < 1 {
            return Err(QueryError::InvalidPage(page));
        }
        if page_size < 0 {
            return Err(QueryError::InvalidPageSize(page_size));
        }
        let page = usize::try_from(page).map_err(|_| QueryError::InvalidPage(page))?;
        let page_size =
            usize::try_from(page_size).map_err(|_| QueryError::InvalidPageSize(page_size))?;
        Ok(Self { page, page_size })
    }

    /// Every result on one page.
    pub fn all() -> Self {
        Self {
            page: 1,
            page_size: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The slice of `items` this page covers; empty past the last page.
    pub fn window<'t, T>(&self, items: &'t [T]) -> &'t [T] {
        if self.page_size == 0 {
            return items;
        }
        let start = (self.page - 1).saturating_mul(self.page_size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::all()
    }
}
