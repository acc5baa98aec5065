//! Fuzzy matching for the dropdown filter.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Case-insensitive fuzzy matcher.
///
/// Wraps the skim algorithm so callers only deal with `matches`.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default(),
        }
    }

    /// Whether `pattern` fuzzy-matches `text`.
    ///
    /// Characters of the pattern must appear in order but not necessarily
    /// next to each other; case is ignored.
    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        self.inner
            .fuzzy_match(text, &pattern.to_lowercase())
            .is_some()
    }
}
