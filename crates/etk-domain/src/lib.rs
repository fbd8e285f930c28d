//! ETK Domain Layer
//!
//! Value objects and trait seams shared by every other ETK crate. Nothing in
//! here knows about documents, paths or the engine; it only describes what a
//! token is, what an extraction is, and what the external collaborators
//! (token providers and extractors) must provide.
//!
//! ## Key Concepts
//!
//! - **Token**: an exact substring of some text with its offset and shape
//! - **Shape**: per-character classification used for pattern matching
//! - **Extraction**: one value produced by an extractor, with provenance
//! - **Error policy**: how the engine reacts to failing modules
//!
//! ## Seams
//!
//! - [`TokenProvider`]: upstream boundary detection (black box)
//! - [`Extractor`]: any unit that turns text, tokens or JSON into values

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document_id;
pub mod error;
pub mod extraction;
pub mod policy;
pub mod token;
pub mod traits;

// Re-exports for convenience
pub use document_id::DocumentId;
pub use error::ExtractorError;
pub use extraction::Extraction;
pub use policy::ErrorPolicy;
pub use token::{shape_of, Token};
pub use traits::{Extractor, ExtractorInput, InputKind, RawSpan, TokenProvider};
