//! The extraction engine
//!
//! [`Etk`] owns the ordered module list and the shared [`Resources`], wraps
//! inputs into [`Document`]s and runs every applicable module over them,
//! applying the configured [`ErrorPolicy`] to module failures.

use crate::config::EtkConfig;
use crate::document::Document;
use crate::error::EtkError;
use crate::knowledge_graph::KnowledgeGraph;
use crate::module::{ExtractionModule, Issue};
use crate::path_index::PathIndex;
use crate::registry::ModuleRegistry;
use crate::resources::Resources;
use crate::schema::KgSchema;
use etk_domain::ErrorPolicy;
use etk_tokenizer::Tokenizer;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Builder for [`Etk`]
pub struct EtkBuilder {
    config: EtkConfig,
    tokenizer: Option<Tokenizer>,
    kg_schema: Option<KgSchema>,
    registry: ModuleRegistry,
}

impl EtkBuilder {
    fn new(config: EtkConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            kg_schema: None,
            registry: ModuleRegistry::new(),
        }
    }

    /// Knowledge graph schema handed to modules through [`Resources`]
    pub fn kg_schema(mut self, schema: KgSchema) -> Self {
        self.kg_schema = Some(schema);
        self
    }

    /// Replace the default word-boundary tokenizer
    pub fn tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Register a ready module instance
    pub fn module<M>(mut self, module: M) -> Self
    where
        M: ExtractionModule + 'static,
    {
        self.registry.register(module);
        self
    }

    /// Register a module constructed from the engine's shared resources
    pub fn module_with<F, M>(mut self, constructor: F) -> Self
    where
        F: FnOnce(&Resources) -> Result<M, EtkError> + Send + 'static,
        M: ExtractionModule + 'static,
    {
        self.registry.register_with(constructor);
        self
    }

    /// Validate the configuration, instantiate modules and order them
    pub fn build(self) -> Result<Etk, EtkError> {
        self.config.validate().map_err(EtkError::Config)?;

        let tokenizer = self
            .tokenizer
            .unwrap_or_default()
            .verify_reconstruction(self.config.verify_reconstruction);
        let resources = Resources::new(
            tokenizer,
            Arc::new(PathIndex::new()),
            self.kg_schema,
            self.config.error_policy,
        );

        let modules = self.registry.load(&resources)?;
        info!(
            "Extraction engine ready: {} modules, error policy '{}'",
            modules.len(),
            self.config.error_policy
        );

        Ok(Etk {
            config: self.config,
            resources,
            modules,
        })
    }
}

/// Result of processing one document in a batch
#[derive(Debug)]
pub struct Processed {
    /// The document, with whatever was extracted before any failure
    pub document: Document,

    /// Why processing stopped early, under the `throw_document` policy
    pub error: Option<EtkError>,
}

impl Processed {
    /// True when every module ran
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The document's knowledge graph
    pub fn kg(&self) -> &KnowledgeGraph {
        self.document.kg()
    }
}

/// Extraction engine
///
/// `Etk` is immutable once built and can be shared across threads; each
/// [`Document`] owns its own knowledge graph.
pub struct Etk {
    config: EtkConfig,
    resources: Resources,
    modules: Vec<Box<dyn ExtractionModule>>,
}

impl std::fmt::Debug for Etk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Etk")
            .field("config", &self.config)
            .field("modules", &self.module_names())
            .finish()
    }
}

impl Etk {
    /// Start building an engine
    pub fn builder(config: EtkConfig) -> EtkBuilder {
        EtkBuilder::new(config)
    }

    /// Active configuration
    pub fn config(&self) -> &EtkConfig {
        &self.config
    }

    /// Resources shared by every document and module
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Module names in execution order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Wrap `raw` in a document with the default origin URL
    pub fn create_document(&self, raw: Value) -> Document {
        self.create_document_with(raw, None, None)
    }

    /// Wrap `raw` in a document with an explicit MIME type and origin URL
    pub fn create_document_with(
        &self,
        raw: Value,
        mime_type: Option<&str>,
        url: Option<&str>,
    ) -> Document {
        Document::with_resources(
            self.resources.clone(),
            raw,
            mime_type.map(str::to_string),
            url.unwrap_or(&self.config.default_origin_url),
        )
    }

    /// Run every applicable module over `doc`, in dependency order
    ///
    /// Module failures are handled by the error policy: `process` and
    /// `throw_extraction` record an issue and move on to the next module,
    /// `throw_document` stops with [`EtkError::Aborted`] and `raise_error`
    /// returns the module's error unchanged. The policy is the one in the
    /// document's [`Resources`], the same one [`Document::extract`] applies.
    /// Tokenizer invariant violations are always returned. Values written
    /// before a failure stay in the document's knowledge graph.
    pub fn process<'d>(&self, doc: &'d mut Document) -> Result<&'d KnowledgeGraph, EtkError> {
        let policy = doc.resources().error_policy();
        debug!("Processing document {} ({})", doc.id(), doc.origin_url());

        for module in &self.modules {
            if !module.document_selector(doc) {
                debug!("Module '{}' skipped document {}", module.name(), doc.id());
                continue;
            }

            let error = match module.process_document(doc) {
                Ok(issues) => {
                    doc.extend_issues(issues);
                    continue;
                }
                Err(e) => e,
            };

            if error.is_fatal() {
                error!("Module '{}' hit a fatal error on document {}: {}", module.name(), doc.id(), error);
                return Err(error);
            }

            match policy {
                ErrorPolicy::Process | ErrorPolicy::ThrowExtraction => {
                    warn!("Module '{}' failed on document {}: {}", module.name(), doc.id(), error);
                    doc.record_issue(Issue::error(module.name(), error.to_string()));
                }
                ErrorPolicy::ThrowDocument => {
                    warn!("Aborting document {} in module '{}': {}", doc.id(), module.name(), error);
                    return Err(EtkError::Aborted {
                        document: doc.id(),
                        module: module.name().to_string(),
                        source: Box::new(error),
                    });
                }
                ErrorPolicy::Raise => {
                    error!("Module '{}' failed on document {}: {}", module.name(), doc.id(), error);
                    return Err(error);
                }
            }
        }

        debug!(
            "Document {} done: {} fields, {} issues",
            doc.id(),
            doc.kg().len(),
            doc.issues().len()
        );
        Ok(doc.kg())
    }

    /// Process documents one after another
    ///
    /// A document aborted under `throw_document` keeps its error in its own
    /// slot and the batch continues. Under `raise_error`, or on a fatal
    /// error, the batch stops and the error is returned.
    pub fn process_all<I>(&self, docs: I) -> Result<Vec<Processed>, EtkError>
    where
        I: IntoIterator<Item = Document>,
    {
        self.process_batch(docs, &AtomicBool::new(false))
    }

    /// Process documents on up to `workers` scoped threads
    ///
    /// Documents are split into contiguous chunks, one per worker, and
    /// results come back in input order. Each worker follows the
    /// [`process_all`](Self::process_all) rules for its chunk. A
    /// batch-stopping error in any worker stops every worker before its next
    /// document, and the first such error in input order is returned.
    pub fn process_parallel(
        &self,
        docs: Vec<Document>,
        workers: usize,
    ) -> Result<Vec<Processed>, EtkError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let workers = workers.clamp(1, docs.len());
        let chunk_size = docs.len().div_ceil(workers);

        let mut chunks: Vec<Vec<Document>> = Vec::with_capacity(workers);
        let mut docs = docs.into_iter();
        loop {
            let chunk: Vec<Document> = docs.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            chunks.push(chunk);
        }
        debug!("Processing {} chunks of up to {} documents", chunks.len(), chunk_size);

        let stop = AtomicBool::new(false);
        let chunk_results: Vec<Result<Vec<Processed>, EtkError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| {
                    let stop = &stop;
                    scope.spawn(move || self.process_batch(chunk, stop))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        let mut processed = Vec::new();
        for result in chunk_results {
            processed.extend(result?);
        }
        Ok(processed)
    }

    /// Sequential batch that gives up once `stop` is set
    ///
    /// Sets `stop` itself when a document raises or fails fatally, so other
    /// batches sharing the flag end too.
    fn process_batch<I>(&self, docs: I, stop: &AtomicBool) -> Result<Vec<Processed>, EtkError>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut processed = Vec::new();
        for mut document in docs {
            if stop.load(Ordering::Acquire) {
                debug!("Batch stopped, leaving document {} unprocessed", document.id());
                break;
            }
            let policy = document.resources().error_policy();
            let error = match self.process(&mut document) {
                Ok(_) => None,
                Err(e) if policy == ErrorPolicy::Raise || e.is_fatal() => {
                    stop.store(true, Ordering::Release);
                    return Err(e);
                }
                Err(e) => Some(e),
            };
            processed.push(Processed { document, error });
        }
        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Literal {
        name: &'static str,
        field: &'static str,
    }

    impl ExtractionModule for Literal {
        fn name(&self) -> &str {
            self.name
        }

        fn document_selector(&self, _doc: &Document) -> bool {
            true
        }

        fn process_document(&self, doc: &mut Document) -> Result<Vec<Issue>, EtkError> {
            doc.add_value(self.field, self.name);
            Ok(Vec::new())
        }
    }

    struct OnlyHtml;

    impl ExtractionModule for OnlyHtml {
        fn document_selector(&self, doc: &Document) -> bool {
            doc.mime_type() == Some("text/html")
        }

        fn process_document(&self, doc: &mut Document) -> Result<Vec<Issue>, EtkError> {
            doc.add_value("html", true);
            Ok(vec![Issue::warning("OnlyHtml", "saw html")])
        }
    }

    #[test]
    fn test_build_requires_modules() {
        let err = Etk::builder(EtkConfig::default()).build().unwrap_err();
        assert!(matches!(err, EtkError::ModuleLoad(_)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = EtkConfig {
            default_origin_url: String::new(),
            ..EtkConfig::default()
        };
        let err = Etk::builder(config)
            .module(Literal { name: "a", field: "f" })
            .build()
            .unwrap_err();
        assert!(matches!(err, EtkError::Config(_)));
    }

    #[test]
    fn test_create_document_defaults() {
        let etk = Etk::builder(EtkConfig::default())
            .module(Literal { name: "a", field: "f" })
            .build()
            .unwrap();
        let doc = etk.create_document(json!({}));
        assert_eq!(doc.origin_url(), "http://ex.com/123");
        assert!(doc.mime_type().is_none());

        let doc = etk.create_document_with(json!({}), Some("text/html"), Some("http://a.b"));
        assert_eq!(doc.origin_url(), "http://a.b");
        assert_eq!(doc.mime_type(), Some("text/html"));
    }

    #[test]
    fn test_selector_gates_modules() {
        let etk = Etk::builder(EtkConfig::default())
            .module(OnlyHtml)
            .module(Literal { name: "always", field: "seen" })
            .build()
            .unwrap();
        assert_eq!(etk.module_names(), ["OnlyHtml", "always"]);

        let mut plain = etk.create_document(json!({}));
        let kg = etk.process(&mut plain).unwrap();
        assert!(!kg.contains_field("html"));
        assert_eq!(kg.get("seen").unwrap(), [json!("always")]);

        let mut html = etk.create_document_with(json!({}), Some("text/html"), None);
        etk.process(&mut html).unwrap();
        assert_eq!(html.kg().get("html").unwrap(), [json!(true)]);
        assert_eq!(html.issues().len(), 1);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Etk>();
        assert_send_sync::<Document>();
    }
}
