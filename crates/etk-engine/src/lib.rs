//! ETK Engine
//!
//! Runs extraction modules over semi-structured documents and collects what
//! they find into a per-document knowledge graph.
//!
//! ## Key Concepts
//!
//! - **Path query**: JSON-path-like expression addressing parts of a tree
//! - **Segment**: a location a path query resolved to, plus the value there
//! - **Extraction module**: domain logic that selects documents and writes
//!   values into their knowledge graph
//! - **Knowledge graph**: ordered field name → values mapping, one per document
//! - **Error policy**: what happens when a module or extractor fails
//!
//! ## Example
//!
//! ```
//! use etk_engine::{Document, Etk, EtkConfig, EtkError, ExtractionModule, Issue};
//! use serde_json::json;
//!
//! struct Titles;
//!
//! impl ExtractionModule for Titles {
//!     fn document_selector(&self, _doc: &Document) -> bool {
//!         true
//!     }
//!
//!     fn process_document(&self, doc: &mut Document) -> Result<Vec<Issue>, EtkError> {
//!         doc.add_value_from_path("title", "items[*].title")?;
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let etk = Etk::builder(EtkConfig::default()).module(Titles).build()?;
//! let mut doc = etk.create_document(json!({"items": [{"title": "a"}, {"title": "b"}]}));
//! let kg = etk.process(&mut doc)?;
//! assert_eq!(kg.to_json(), json!({"title": ["a", "b"]}));
//! # Ok::<(), EtkError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod knowledge_graph;
pub mod module;
pub mod path;
pub mod path_index;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod segment;

pub use config::EtkConfig;
pub use document::{Document, Target};
pub use engine::{Etk, EtkBuilder, Processed};
pub use error::{EtkError, PathError};
pub use knowledge_graph::KnowledgeGraph;
pub use module::{ExtractionModule, Issue, Severity};
pub use path::{CompiledPath, Location, PathKey, Selector};
pub use path_index::PathIndex;
pub use registry::ModuleRegistry;
pub use resources::Resources;
pub use schema::KgSchema;
pub use segment::Segment;

// Re-exports so modules only need this crate
pub use etk_domain::{
    DocumentId, ErrorPolicy, Extraction, Extractor, ExtractorError, ExtractorInput, InputKind,
    Token,
};
pub use etk_tokenizer::Tokenizer;
