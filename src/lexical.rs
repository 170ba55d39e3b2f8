//! Lexical search implementation using an inverted index.
//!
//! This module provides the keyword half of the retrieval pipeline: an
//! in-memory inverted index over the corpus cache with BM25 scoring and
//! max-normalized top-k results. The index is built once at engine
//! construction and can be permanently disabled (empty corpus, or a vector
//! index that refused enumeration), in which case the engine runs
//! semantic-only.
//!
//! # Module Structure
//!
//! - `index`: Inverted index construction and top-k search
//! - `scorer`: BM25 scoring

pub mod index;
pub mod scorer;

pub use self::index::{LexicalHit, LexicalIndex};
pub use self::scorer::Bm25Scorer;
