//! Default upstream provider based on Unicode word boundaries

use etk_domain::{RawSpan, TokenProvider};
use unicode_segmentation::UnicodeSegmentation;

/// Splits text on UAX #29 word boundaries
///
/// Numbers keep their decimal separators (`32.4` is one span), punctuation
/// becomes single-character spans, and whitespace runs are dropped unless
/// `keep_whitespace` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBoundaryProvider {
    keep_whitespace: bool,
}

impl WordBoundaryProvider {
    /// Create a provider that drops whitespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report whitespace runs as spans
    pub fn keep_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }
}

impl TokenProvider for WordBoundaryProvider {
    fn spans(&self, text: &str) -> Vec<RawSpan> {
        text.split_word_bound_indices()
            .filter(|(_, word)| self.keep_whitespace || !word.chars().all(char::is_whitespace))
            .map(|(start, word)| RawSpan::new(word, start))
            .collect()
    }
}
