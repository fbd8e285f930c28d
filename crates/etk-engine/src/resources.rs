//! Shared resources injected into documents and modules

use crate::path_index::PathIndex;
use crate::schema::KgSchema;
use etk_domain::ErrorPolicy;
use etk_tokenizer::Tokenizer;
use std::sync::Arc;

/// Everything the engine shares across documents and modules
///
/// Cloning is cheap; all clones point at the same path cache, so a query
/// compiled while processing one document is reused by every other.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    tokenizer: Tokenizer,
    path_index: Arc<PathIndex>,
    kg_schema: Option<Arc<KgSchema>>,
    error_policy: ErrorPolicy,
}

impl Resources {
    /// Bundle resources
    pub fn new(
        tokenizer: Tokenizer,
        path_index: Arc<PathIndex>,
        kg_schema: Option<KgSchema>,
        error_policy: ErrorPolicy,
    ) -> Self {
        Self {
            tokenizer,
            path_index,
            kg_schema: kg_schema.map(Arc::new),
            error_policy,
        }
    }

    /// Default tokenizer
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Shared compiled-path cache
    pub fn path_index(&self) -> &PathIndex {
        &self.path_index
    }

    /// Knowledge graph schema, when one was configured
    pub fn kg_schema(&self) -> Option<&KgSchema> {
        self.kg_schema.as_deref()
    }

    /// Active error policy
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }
}
