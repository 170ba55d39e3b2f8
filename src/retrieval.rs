//! Score fusion across the lexical and semantic retrieval channels.
//!
//! Both channels report hits keyed by stable chunk id; fusion takes the
//! union, applies the weighted formula, and produces one deterministic
//! ranking. The chunks selected by fusion are resolved against the corpus
//! cache into [`RetrievedChunk`]s, the unit the prompt composer and the
//! generation orchestrator consume.
//!
//! # Module Structure
//!
//! - `config`: Retrieval weights and fan-out settings
//! - `fusion`: The weighted union merge

pub mod config;
pub mod fusion;

pub use self::config::RetrievalConfig;
pub use self::fusion::{ScoreFusion, ScoredCandidate, SemanticHit};

use crate::corpus::Chunk;

/// A chunk selected by fusion, carrying its fused score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    /// The resolved corpus chunk.
    pub chunk: Chunk,
    /// Fused relevance score in [0, 1].
    pub score: f32,
}

impl RetrievedChunk {
    /// Create a new retrieved chunk.
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self { chunk, score }
    }
}
