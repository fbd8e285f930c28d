//! Error policy - how the engine reacts to failing modules

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy applied when an extractor or module fails during processing
///
/// - Process: log the failure, record it on the document, keep going
/// - ThrowExtraction: a failing extractor aborts the current module only
/// - ThrowDocument: abort the current document, other documents unaffected
/// - Raise: propagate immediately and stop the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorPolicy {
    /// Log, record and continue with the next module
    #[default]
    Process,

    /// Abort the failing module's extraction step, continue with the next module
    ThrowExtraction,

    /// Abort processing of the current document
    ThrowDocument,

    /// Propagate the error as-is, terminating the run
    Raise,
}

impl ErrorPolicy {
    /// Get the selector string for this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Process => "process",
            ErrorPolicy::ThrowExtraction => "throw_extraction",
            ErrorPolicy::ThrowDocument => "throw_document",
            ErrorPolicy::Raise => "raise_error",
        }
    }

    /// Parse a selector string, case-insensitively
    ///
    /// Returns `None` for unrecognized selectors; see [`ErrorPolicy::from_selector`]
    /// for the lenient variant used by configuration.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "process" => Some(ErrorPolicy::Process),
            "throw_extraction" => Some(ErrorPolicy::ThrowExtraction),
            "throw_document" => Some(ErrorPolicy::ThrowDocument),
            "raise_error" => Some(ErrorPolicy::Raise),
            _ => None,
        }
    }

    /// Parse a selector string, falling back to [`ErrorPolicy::Process`]
    ///
    /// # Examples
    ///
    /// ```
    /// use etk_domain::ErrorPolicy;
    ///
    /// assert_eq!(ErrorPolicy::from_selector("RAISE_ERROR"), ErrorPolicy::Raise);
    /// assert_eq!(ErrorPolicy::from_selector("whatever"), ErrorPolicy::Process);
    /// ```
    pub fn from_selector(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// True when extractor failures are swallowed inside the document
    pub fn tolerates_extractor_errors(&self) -> bool {
        matches!(self, ErrorPolicy::Process)
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ErrorPolicy {
    fn from(s: String) -> Self {
        Self::from_selector(&s)
    }
}

impl From<ErrorPolicy> for String {
    fn from(policy: ErrorPolicy) -> Self {
        policy.as_str().to_string()
    }
}
