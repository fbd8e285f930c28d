//! Extraction module contract

use crate::document::Document;
use crate::error::EtkError;
use serde::Serialize;
use std::fmt;

/// Severity of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something was skipped or looked odd, results are still usable
    Warning,
    /// A module or extractor failed and its output is incomplete
    Error,
}

/// A non-fatal problem reported while processing a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Module or extractor that reported it
    pub source: String,

    /// How bad it is
    pub severity: Severity,

    /// Description
    pub message: String,
}

impl Issue {
    /// A warning
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// An error absorbed by the error policy
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}] {}: {}", level, self.source, self.message)
    }
}

/// A unit of domain logic run by the engine
///
/// Implementors hold their extractors and any injected
/// [`Resources`](crate::Resources), but no per-document state: the engine may
/// call them for many documents, possibly from several threads.
pub trait ExtractionModule: Send + Sync {
    /// Name used for dependency declarations and logging
    ///
    /// Defaults to the implementing type's name without its module path.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// Names of modules whose output this module reads
    fn depends_on(&self) -> &[&str] {
        &[]
    }

    /// Whether this module applies to `doc`. Must not have side effects.
    fn document_selector(&self, doc: &Document) -> bool;

    /// Extract from `doc` into its knowledge graph, returning non-fatal issues
    fn process_document(&self, doc: &mut Document) -> Result<Vec<Issue>, EtkError>;
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Strip generic arguments before taking the last path component
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainModule;

    impl ExtractionModule for PlainModule {
        fn document_selector(&self, _doc: &Document) -> bool {
            true
        }

        fn process_document(&self, _doc: &mut Document) -> Result<Vec<Issue>, EtkError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_default_name_is_short_type_name() {
        assert_eq!(PlainModule.name(), "PlainModule");
        assert!(PlainModule.depends_on().is_empty());
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue::warning("names", "no description");
        assert_eq!(issue.to_string(), "[warning] names: no description");
        assert_eq!(Issue::error("m", "x").severity, Severity::Error);
    }
}
