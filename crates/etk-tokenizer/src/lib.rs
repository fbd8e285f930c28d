//! ETK Tokenizer
//!
//! Turns text into an ordered token stream that reconstructs the input
//! exactly.
//!
//! # Architecture
//!
//! ```text
//! text → TokenProvider (raw spans) → Tokenizer (validate, fill gaps, offsets, shapes) → Vec<Token>
//! ```
//!
//! Raw boundaries come from a pluggable [`TokenProvider`]. Providers are free
//! to drop whitespace; the [`Tokenizer`] re-inserts every uncovered gap as an
//! explicit token so that concatenating token texts yields the input again.
//!
//! # Example Usage
//!
//! ```
//! use etk_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::default();
//! let tokens = tokenizer.tokenize("32.4 -32.1").unwrap();
//!
//! let shapes: Vec<&str> = tokens.iter().map(|t| t.shape.as_str()).collect();
//! assert_eq!(shapes, ["dd.d", " ", "-", "dd.d"]);
//! assert_eq!(Tokenizer::reconstruct(&tokens), "32.4 -32.1");
//! ```

#![warn(missing_docs)]

mod error;
mod provider;
mod tokenizer;

pub use error::TokenizerError;
pub use etk_domain::{RawSpan, Token, TokenProvider};
pub use provider::WordBoundaryProvider;
pub use tokenizer::Tokenizer;
