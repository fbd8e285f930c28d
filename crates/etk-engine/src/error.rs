//! Error types for the engine

use etk_domain::{DocumentId, ExtractorError};
use etk_tokenizer::TokenizerError;
use thiserror::Error;

/// A path query that failed to compile
///
/// Compilation is deterministic, so the same query always produces the same
/// error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid path {query:?} at byte {position}: {reason}")]
pub struct PathError {
    /// The query as given
    pub query: String,

    /// Byte position where parsing stopped
    pub position: usize,

    /// What the parser expected
    pub reason: String,
}

impl PathError {
    pub(crate) fn new(query: &str, position: usize, reason: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            position,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while building the engine or processing documents
#[derive(Error, Debug)]
pub enum EtkError {
    /// Malformed path query
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// Module registration, instantiation or ordering failed
    #[error("Module load error: {0}")]
    ModuleLoad(String),

    /// An extractor failed and the error policy did not absorb it
    #[error("Extraction error: {source}")]
    Extraction {
        /// Name of the failing extractor
        extractor: String,
        /// Underlying extractor error
        #[source]
        source: ExtractorError,
    },

    /// A module reported a failure of its own
    #[error("Module '{module}' failed: {message}")]
    Module {
        /// Module name
        module: String,
        /// Failure description
        message: String,
    },

    /// Tokens failed to reconstruct their text; always fatal
    #[error("Tokenizer invariant violated: {0}")]
    Reconstruction(#[from] TokenizerError),

    /// Writing derived values into the document failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Processing of a document was aborted by the `throw_document` policy
    #[error("Document {document} aborted in module '{module}': {source}")]
    Aborted {
        /// Document that was being processed
        document: DocumentId,
        /// Module that failed
        module: String,
        /// What went wrong
        #[source]
        source: Box<EtkError>,
    },
}

impl EtkError {
    /// Shorthand for [`EtkError::Module`], for use inside module code
    pub fn module(module: impl Into<String>, message: impl Into<String>) -> Self {
        EtkError::Module {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Errors that bypass the error policy
    pub fn is_fatal(&self) -> bool {
        match self {
            EtkError::Reconstruction(_) => true,
            EtkError::Extraction { source, .. } => source.is_fatal(),
            EtkError::Aborted { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}
