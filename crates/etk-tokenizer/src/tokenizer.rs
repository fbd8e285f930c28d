//! Core Tokenizer implementation

use crate::error::TokenizerError;
use crate::provider::WordBoundaryProvider;
use etk_domain::{Token, TokenProvider};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Wraps an upstream provider and guarantees lossless token streams
///
/// The tokenizer is immutable and cheap to share; clone it or put it behind
/// an `Arc` to use it from several threads.
#[derive(Clone)]
pub struct Tokenizer {
    provider: Arc<dyn TokenProvider>,
    verify: bool,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("verify", &self.verify)
            .finish_non_exhaustive()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(WordBoundaryProvider::new())
    }
}

impl Tokenizer {
    /// Create a tokenizer over the given provider
    pub fn new(provider: impl TokenProvider + 'static) -> Self {
        Self::with_provider(Arc::new(provider))
    }

    /// Create a tokenizer over a shared provider
    pub fn with_provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            verify: true,
        }
    }

    /// Enable or disable the round-trip check after every call
    pub fn verify_reconstruction(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Tokenize `text`
    ///
    /// Every byte of the input ends up in exactly one token. Stretches the
    /// provider did not cover (usually whitespace) become their own tokens.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        let spans = self.provider.spans(text);
        let mut tokens = Vec::with_capacity(spans.len() * 2 + 1);

        // Byte cursor into `text` and the matching code point offset
        let mut cursor = 0;
        let mut char_offset = 0;

        for span in spans {
            if span.text.is_empty() {
                continue;
            }
            if span.start < cursor {
                return Err(TokenizerError::InvalidSpan {
                    start: span.start,
                    reason: format!("overlaps or precedes previous span ending at byte {}", cursor),
                });
            }

            let end = span.end().ok_or_else(|| TokenizerError::InvalidSpan {
                start: span.start,
                reason: "span end overflows".to_string(),
            })?;
            match text.get(span.start..end) {
                Some(slice) if slice == span.text => {}
                Some(slice) => {
                    return Err(TokenizerError::InvalidSpan {
                        start: span.start,
                        reason: format!("span text {:?} does not match input {:?}", span.text, slice),
                    });
                }
                None => {
                    return Err(TokenizerError::InvalidSpan {
                        start: span.start,
                        reason: format!(
                            "range {}..{} is out of bounds or not on a char boundary",
                            span.start, end
                        ),
                    });
                }
            }

            if span.start > cursor {
                char_offset = push_gap(&mut tokens, &text[cursor..span.start], char_offset);
            }

            let len = span.text.chars().count();
            tokens.push(Token::new(span.text, char_offset));
            char_offset += len;
            cursor = end;
        }

        if cursor < text.len() {
            push_gap(&mut tokens, &text[cursor..], char_offset);
        }

        if self.verify {
            check_reconstruction(text, &tokens)?;
        }

        Ok(tokens)
    }

    /// Concatenate token texts in the given order
    ///
    /// No offsets are consulted, so a filtered token list reconstructs only
    /// the filtered tokens.
    pub fn reconstruct(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Push an uncovered stretch of input as one token, returning the next offset
fn push_gap(tokens: &mut Vec<Token>, gap: &str, char_offset: usize) -> usize {
    if !gap.chars().all(char::is_whitespace) {
        debug!("Provider skipped non-whitespace text {:?} at offset {}", gap, char_offset);
    }
    let len = gap.chars().count();
    tokens.push(Token::new(gap, char_offset));
    char_offset + len
}

fn check_reconstruction(text: &str, tokens: &[Token]) -> Result<(), TokenizerError> {
    let rebuilt = Tokenizer::reconstruct(tokens);
    if rebuilt == text {
        return Ok(());
    }

    let first_difference = text
        .bytes()
        .zip(rebuilt.bytes())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| text.len().min(rebuilt.len()));

    Err(TokenizerError::ReconstructionViolation {
        expected_len: text.len(),
        actual_len: rebuilt.len(),
        first_difference,
    })
}
