//! Error types for the Tokenizer

use thiserror::Error;

/// Errors that can occur while tokenizing
///
/// Both variants indicate a bug in the tokenizer or its provider, never a
/// problem with the input text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    /// Provider returned a span that does not describe the input
    #[error("Invalid span at byte {start}: {reason}")]
    InvalidSpan {
        /// Byte offset reported by the provider
        start: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Token texts do not concatenate back to the input
    #[error("Reconstruction violation: expected {expected_len} bytes, rebuilt {actual_len} bytes (first difference at byte {first_difference})")]
    ReconstructionViolation {
        /// Length of the original text
        expected_len: usize,
        /// Length of the reconstructed text
        actual_len: usize,
        /// First byte where the two differ
        first_difference: usize,
    },
}
