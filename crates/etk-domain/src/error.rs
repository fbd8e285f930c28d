//! Error types raised by extractor collaborators

use thiserror::Error;

/// Errors that an [`Extractor`](crate::Extractor) can report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// The extractor was handed an input kind it cannot work with
    #[error("Unsupported input for extractor '{extractor}': expected {expected}")]
    UnsupportedInput {
        /// Extractor name
        extractor: String,
        /// Human readable description of the expected input
        expected: String,
    },

    /// The extractor's own resources are unusable (bad pattern, empty glossary, ...)
    #[error("Invalid extractor configuration: {0}")]
    Config(String),

    /// The extractor tokenized its input itself and the tokenizer broke its
    /// invariants; never absorbed by an error policy
    #[error("Extractor '{extractor}' hit a tokenizer failure: {message}")]
    Tokenizer {
        /// Extractor name
        extractor: String,
        /// Tokenizer error description
        message: String,
    },

    /// Anything that went wrong while running
    #[error("Extractor '{extractor}' failed: {message}")]
    Failed {
        /// Extractor name
        extractor: String,
        /// Failure description
        message: String,
    },
}

impl ExtractorError {
    /// Shorthand for [`ExtractorError::Failed`]
    pub fn failed(extractor: impl Into<String>, message: impl Into<String>) -> Self {
        ExtractorError::Failed {
            extractor: extractor.into(),
            message: message.into(),
        }
    }

    /// Errors no error policy may absorb
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractorError::Tokenizer { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_tokenizer_failures_are_fatal() {
        let tokenizer = ExtractorError::Tokenizer {
            extractor: "names".to_string(),
            message: "Invalid span at byte 0".to_string(),
        };
        assert!(tokenizer.is_fatal());
        assert!(!ExtractorError::failed("names", "boom").is_fatal());
        assert!(!ExtractorError::Config("bad".to_string()).is_fatal());
    }
}
