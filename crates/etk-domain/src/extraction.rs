//! Extraction results

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single value produced by an extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Extracted value
    pub value: Value,

    /// Name of the extractor that produced it
    pub extractor: String,

    /// Start of the matched text, in code points, when the input was text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_char: Option<usize>,

    /// End of the matched text (exclusive), in code points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_char: Option<usize>,

    /// Confidence in [0.0, 1.0]
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl Extraction {
    /// Create an extraction with full confidence and no provenance
    pub fn new(value: impl Into<Value>, extractor: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            extractor: extractor.into(),
            start_char: None,
            end_char: None,
            confidence: default_confidence(),
        }
    }

    /// Attach character provenance
    pub fn with_span(mut self, start_char: usize, end_char: usize) -> Self {
        self.start_char = Some(start_char);
        self.end_char = Some(end_char);
        self
    }

    /// Set the confidence, clamped to [0.0, 1.0]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

impl From<Extraction> for Value {
    fn from(extraction: Extraction) -> Self {
        extraction.value
    }
}
