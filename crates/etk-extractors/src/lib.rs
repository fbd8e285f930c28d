//! ETK Extractors
//!
//! Ready-made [`Extractor`](etk_domain::Extractor) implementations that
//! extraction modules can own and run through `Document::extract`.
//!
//! - [`GlossaryExtractor`]: longest-match lookup of known phrases in a token stream
//! - [`RegexExtractor`]: regular expression matches over text
//! - [`ShapeExtractor`]: tokens whose shape signature equals a given shape

#![warn(missing_docs)]

mod glossary;
mod pattern;
mod shape;

pub use glossary::{Glossary, GlossaryExtractor};
pub use pattern::RegexExtractor;
pub use shape::ShapeExtractor;
