//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the engine and the pluggable
//! pieces around it. Implementations live in other crates or in user code.

use crate::{Extraction, ExtractorError, Token};
use serde_json::Value;

/// A raw token span reported by an upstream provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpan {
    /// Text of the span, which must equal the input at `start`
    pub text: String,

    /// Byte offset of the span in the input
    pub start: usize,
}

impl RawSpan {
    /// Create a new span
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        Self {
            text: text.into(),
            start,
        }
    }

    /// Byte offset one past the end of the span, `None` if it overflows
    pub fn end(&self) -> Option<usize> {
        self.start.checked_add(self.text.len())
    }
}

/// Upstream token boundary detection
///
/// Providers may skip whitespace or anything else they consider a
/// non-token; the tokenizer fills the gaps back in.
pub trait TokenProvider: Send + Sync {
    /// Split `text` into ordered, non-overlapping spans
    fn spans(&self, text: &str) -> Vec<RawSpan>;
}

/// What kind of input an extractor wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Plain text
    Text,
    /// Tokens of the text, produced by the shared tokenizer
    Tokens,
    /// The raw JSON value at the target location
    Value,
}

/// Input handed to an extractor
#[derive(Debug, Clone, Copy)]
pub enum ExtractorInput<'a> {
    /// Plain text
    Text(&'a str),
    /// Full, unfiltered token stream of a text
    Tokens(&'a [Token]),
    /// A JSON value
    Value(&'a Value),
}

/// A unit of extraction logic (glossary matcher, pattern matcher, ...)
pub trait Extractor: Send + Sync {
    /// Name used for provenance and logging
    fn name(&self) -> &str;

    /// The input this extractor works on
    fn input_kind(&self) -> InputKind;

    /// Run the extractor, returning values in input order
    fn extract(&self, input: ExtractorInput<'_>) -> Result<Vec<Extraction>, ExtractorError>;
}
