//! Literal marker matching for prompt detection.
//!
//! The PDU's prompts are fixed strings, so matching is exact byte-substring
//! search with no pattern language.

use std::fmt;

use memchr::memmem;

/// Trait for prompt matching over the received byte stream.
pub trait PromptMatcher: Send + Sync {
    /// Returns `(start, end)` of the first match, or None if no match.
    fn find_match(&self, data: &[u8]) -> Option<(usize, usize)>;

    /// Check if the data matches.
    fn is_match(&self, data: &[u8]) -> bool {
        self.find_match(data).is_some()
    }
}

impl PromptMatcher for str {
    fn find_match(&self, data: &[u8]) -> Option<(usize, usize)> {
        memmem::find(data, self.as_bytes()).map(|start| (start, start + self.len()))
    }
}

/// A set of alternative literal markers; any one of them satisfies a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    markers: Vec<String>,
}

impl MarkerSet {
    /// Create a set from one or more literal markers.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// A set holding a single marker.
    pub fn single(marker: impl Into<String>) -> Self {
        Self {
            markers: vec![marker.into()],
        }
    }

    /// The markers in declaration order.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Find which marker matched first, returning its index and span.
    ///
    /// The match that ends earliest in `data` wins, so the stream is never
    /// consumed past a shorter prompt that already arrived. Ties go to the
    /// marker declared first.
    pub fn find_marker(&self, data: &[u8]) -> Option<(usize, usize, usize)> {
        self.markers
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_empty())
            .filter_map(|(i, m)| m.as_str().find_match(data).map(|(s, e)| (i, s, e)))
            .min_by_key(|&(i, _, end)| (end, i))
    }
}

impl PromptMatcher for MarkerSet {
    fn find_match(&self, data: &[u8]) -> Option<(usize, usize)> {
        self.find_marker(data).map(|(_, start, end)| (start, end))
    }
}

impl From<&str> for MarkerSet {
    fn from(marker: &str) -> Self {
        Self::single(marker)
    }
}

impl fmt::Display for MarkerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.markers.join(" | "))
    }
}
