//! The top-level question answering engine.
//!
//! Assembles the full pipeline over a loaded index artifact: hybrid
//! retrieval (lexical BM25 + vector similarity, fused), prompt composition,
//! orchestrated generation with fallback, and citation enforcement.
//!
//! Construction is the only fallible phase. Once built, `ask` always
//! produces an [`AnswerResult`]: retrieval failures degrade to fewer or no
//! contexts, generation failures route to the extractive fallback, and an
//! empty corpus yields a canned reply. All query methods take `&self`; the
//! engine is safe to share across request handlers.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::citation::CitationEnforcer;
use crate::corpus::{Chunk, CorpusCache, SNIPPET_MAX_CHARS};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::generation::{GenerationConfig, GenerationOrchestrator, NOT_FOUND_ANSWER};
use crate::lexical::LexicalIndex;
use crate::prompt::PromptComposer;
use crate::retrieval::{RetrievalConfig, RetrievedChunk, ScoreFusion, SemanticHit};
use crate::vector::{IndexArtifact, VectorHit, VectorIndex, ranking_similarity};

/// Configuration for the answer engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hybrid retrieval weights and fan-out.
    pub retrieval: RetrievalConfig,
    /// Generation backend selection and limits.
    pub generation: GenerationConfig,
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()
    }
}

/// One source chunk backing an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Page the chunk came from, when known.
    pub page: Option<u32>,
    /// Short excerpt of the chunk content.
    pub snippet: String,
    /// Fused relevance score in [0, 1].
    pub score: f32,
}

/// The product of one `ask` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The final answer text, citation included.
    pub answer: String,
    /// Sources in fused ranking order.
    pub sources: Vec<SourceRef>,
    /// The original question, echoed back.
    pub question: String,
}

/// One ranked hit returned by `search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Full chunk content.
    pub content: String,
    /// Page the chunk came from, when known.
    pub page: Option<u32>,
    /// Source document the chunk came from.
    pub source: String,
    /// Fused relevance score in [0, 1].
    pub score: f32,
}

/// A point-in-time summary of the engine's loaded state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Number of indexed chunks.
    pub chunk_count: usize,
    /// Embedding dimension.
    pub dimension: usize,
    /// Whether the lexical channel is enabled.
    pub lexical_enabled: bool,
    /// Number of distinct terms in the lexical index.
    pub lexical_terms: usize,
    /// Name of the configured generation backend.
    pub backend: String,
}

/// The ask/search facade over a loaded index.
pub struct AnswerEngine {
    vector_index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    corpus: CorpusCache,
    lexical: LexicalIndex,
    fusion: ScoreFusion,
    composer: PromptComposer,
    orchestrator: GenerationOrchestrator,
    enforcer: CitationEnforcer,
}

impl std::fmt::Debug for AnswerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerEngine")
            .field("chunk_count", &self.vector_index.len())
            .field("lexical_enabled", &self.lexical.is_enabled())
            .finish()
    }
}

impl AnswerEngine {
    /// Load an index artifact from disk and assemble an engine over it.
    pub fn open<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<Self> {
        let artifact = IndexArtifact::load(path)?;
        info!(
            "loaded index artifact: {} chunks, dimension {}",
            artifact.metadata.chunk_count, artifact.metadata.dimension
        );
        Self::with_index(
            Arc::new(artifact.index),
            Arc::new(artifact.embedder),
            config,
        )
    }

    /// Assemble an engine over an already-loaded index and embedder.
    ///
    /// Enumerates the index to build the corpus cache and the lexical
    /// channel. An index that refuses enumeration degrades the engine to
    /// semantic-only retrieval; it does not fail construction.
    pub fn with_index(
        vector_index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let (corpus, lexical) = match vector_index.enumerate() {
            Ok(records) => {
                let corpus = CorpusCache::from_records(records);
                let lexical = LexicalIndex::build(&corpus);
                (corpus, lexical)
            }
            Err(e) => {
                warn!("corpus enumeration failed, lexical channel disabled: {e}");
                (CorpusCache::empty(), LexicalIndex::disabled())
            }
        };

        let orchestrator = GenerationOrchestrator::from_config(&config.generation)?;

        Ok(Self {
            vector_index,
            embedder,
            corpus,
            lexical,
            fusion: ScoreFusion::new(config.retrieval),
            composer: PromptComposer::new(),
            orchestrator,
            enforcer: CitationEnforcer::new(),
        })
    }

    /// Answer a question from the indexed corpus.
    ///
    /// Never fails at query time. `k` overrides the configured default
    /// result count; it is clamped to at least 1.
    pub async fn ask(&self, question: &str, k: Option<usize>) -> AnswerResult {
        let k = k.unwrap_or(self.fusion.config().default_k).max(1);

        if self.vector_index.is_empty() {
            return self.not_found(question);
        }

        let contexts = self.retrieve(question, k);
        if contexts.is_empty() {
            return self.not_found(question);
        }

        let prompt = self.composer.compose(question, &contexts);
        let outcome = self.orchestrator.generate(&prompt, &contexts).await;
        debug!("answer produced via {} route", outcome.route.name());

        let answer = self.enforcer.enforce(outcome.answer.trim(), &contexts);
        let sources = contexts
            .iter()
            .map(|c| SourceRef {
                page: c.chunk.page,
                snippet: c.chunk.snippet(SNIPPET_MAX_CHARS),
                score: c.score,
            })
            .collect();

        AnswerResult {
            answer,
            sources,
            question: question.to_string(),
        }
    }

    /// Rank chunks for a question without generating an answer.
    ///
    /// Runs the identical retrieval pipeline as `ask`.
    pub fn search(&self, question: &str, k: Option<usize>) -> Vec<SearchHit> {
        let k = k.unwrap_or(self.fusion.config().default_k).max(1);
        if self.vector_index.is_empty() {
            return Vec::new();
        }

        self.retrieve(question, k)
            .into_iter()
            .map(|c| SearchHit {
                content: c.chunk.content,
                page: c.chunk.page,
                source: c.chunk.source_file,
                score: c.score,
            })
            .collect()
    }

    /// A point-in-time summary of what the engine has loaded.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            chunk_count: self.vector_index.len(),
            dimension: self.vector_index.dimension(),
            lexical_enabled: self.lexical.is_enabled(),
            lexical_terms: self.lexical.term_count(),
            backend: self.orchestrator.backend_name().to_string(),
        }
    }

    /// Run hybrid retrieval for `k` final results.
    ///
    /// Each channel is over-fetched, then fused. A failing semantic channel
    /// contributes nothing rather than erroring; with the lexical channel
    /// disabled the semantic ranking passes through unfused.
    fn retrieve(&self, question: &str, k: usize) -> Vec<RetrievedChunk> {
        let fetch = self.fusion.overfetch_count(k);

        let vector_hits = self.semantic_hits(question, fetch);
        let semantic: Vec<SemanticHit> = vector_hits
            .iter()
            .map(|hit| SemanticHit {
                chunk_id: hit.ordinal,
                score: ranking_similarity(hit.distance),
            })
            .collect();

        let candidates = if self.lexical.is_enabled() {
            let lexical_hits = self.lexical.search(question, fetch);
            self.fusion.merge(&lexical_hits, &semantic, k)
        } else {
            self.fusion.passthrough(&semantic, k)
        };

        candidates
            .into_iter()
            .filter_map(|candidate| {
                self.resolve(candidate.chunk_id, &vector_hits)
                    .map(|chunk| RetrievedChunk::new(chunk, candidate.fused_score))
            })
            .collect()
    }

    /// Query the vector index, absorbing failures into an empty hit set.
    fn semantic_hits(&self, question: &str, fetch: usize) -> Vec<VectorHit> {
        let query = match self.embedder.encode(question) {
            Ok(vector) => vector,
            Err(e) => {
                warn!("query embedding failed, semantic channel yields nothing: {e}");
                return Vec::new();
            }
        };

        match self.vector_index.search_by_vector(query.as_slice(), fetch) {
            Ok(hits) => hits,
            Err(e) => {
                warn!("vector search failed, semantic channel yields nothing: {e}");
                Vec::new()
            }
        }
    }

    /// Resolve a chunk id to its content, via the corpus cache or, when
    /// enumeration was refused, via the record carried by the vector hit.
    fn resolve(&self, chunk_id: u64, vector_hits: &[VectorHit]) -> Option<Chunk> {
        if let Some(chunk) = self.corpus.get(chunk_id) {
            return Some(chunk.clone());
        }
        vector_hits
            .iter()
            .find(|hit| hit.ordinal == chunk_id)
            .map(|hit| Chunk::from_record(chunk_id, hit.record.clone()))
    }

    fn not_found(&self, question: &str) -> AnswerResult {
        AnswerResult {
            answer: NOT_FOUND_ANSWER.to_string(),
            sources: Vec::new(),
            question: question.to_string(),
        }
    }
}
