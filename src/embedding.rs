//! Deterministic text embedding for the semantic channel.
//!
//! The engine embeds queries with the exact function ingestion used, so the
//! trained embedder state is serialized into the index artifact and restored
//! on load. Everything here is deterministic: vocabulary indices are assigned
//! in sorted order, not map-iteration order, so an embedder trained twice on
//! the same corpus produces identical vectors.

use std::collections::{HashMap, HashSet};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenize;
use crate::error::{KontosError, Result};
use crate::vector::Vector;

/// Anything that can turn text into a fixed-dimension vector.
///
/// Implementations must be deterministic for a fixed state and input; the
/// semantic channel relies on query vectors matching ingestion-time vectors.
pub trait Embedder: Send + Sync {
    /// Embed text into a vector of `dimension()` components.
    fn encode(&self, text: &str) -> Result<Vector>;

    /// Output vector dimension.
    fn dimension(&self) -> usize;
}

/// Tunable parameters for the TF-IDF embedder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Output vector dimension.
    pub dimension: usize,
    /// Whether to L2-normalize embeddings.
    pub normalize: bool,
    /// Minimum document frequency for a term to enter the vocabulary.
    pub min_term_freq: usize,
    /// Maximum vocabulary size.
    pub max_vocab_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 128,
            normalize: true,
            min_term_freq: 1,
            max_vocab_size: 10000,
        }
    }
}

/// A trainable TF-IDF embedder.
///
/// Trained once at ingestion over the full chunk corpus; its state travels
/// inside the index artifact so query-time encoding is byte-for-byte the
/// same function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfEmbedder {
    config: EmbeddingConfig,
    vocabulary: HashMap<String, usize>,
    document_frequencies: HashMap<String, usize>,
    total_documents: usize,
    is_trained: bool,
}

impl TfIdfEmbedder {
    /// Create a new, untrained embedder.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            document_frequencies: HashMap::new(),
            total_documents: 0,
            is_trained: false,
        }
    }

    /// Train on a corpus of documents, building vocabulary and document
    /// frequencies.
    pub fn train(&mut self, documents: &[&str]) {
        self.total_documents = documents.len();
        let mut frequencies: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let tokens = tokenize(document);
            let mut seen_terms = HashSet::new();
            for token in tokens {
                // Document frequency counts a term once per document.
                if seen_terms.insert(token.clone()) {
                    *frequencies.entry(token).or_insert(0) += 1;
                }
            }
        }

        // Deterministic vocabulary order: frequent terms first, ties
        // alphabetical, truncated to the configured size.
        let mut terms: Vec<(String, usize)> = frequencies
            .iter()
            .filter(|&(_, &df)| df >= self.config.min_term_freq)
            .map(|(term, &df)| (term.clone(), df))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(self.config.max_vocab_size);

        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, (term, _))| (term, index))
            .collect();
        frequencies.retain(|term, _| self.vocabulary.contains_key(term));
        self.document_frequencies = frequencies;
        self.is_trained = true;
    }

    /// Generate an embedding for a text.
    ///
    /// Text containing only out-of-vocabulary terms embeds to the zero
    /// vector.
    pub fn embed(&self, text: &str) -> Result<Vector> {
        if !self.is_trained {
            return Err(KontosError::embedding(
                "embedder must be trained before use",
            ));
        }

        let tokens = tokenize(text);
        let mut vector_data = vec![0.0f32; self.config.dimension];

        let mut term_counts: AHashMap<&str, usize> = AHashMap::new();
        for token in &tokens {
            *term_counts.entry(token.as_str()).or_insert(0) += 1;
        }
        let total_tokens = tokens.len() as f32;

        for (term, &count) in &term_counts {
            if let Some(&vocab_index) = self.vocabulary.get(*term) {
                let tf = count as f32 / total_tokens;
                let df = self
                    .document_frequencies
                    .get(*term)
                    .copied()
                    .unwrap_or(1)
                    .max(1);
                // Smoothed so single-document corpora keep nonzero weights.
                let idf = (1.0 + self.total_documents as f32 / df as f32).ln();
                vector_data[vocab_index % self.config.dimension] += tf * idf;
            }
        }

        let mut vector = Vector::new(vector_data);
        if self.config.normalize {
            vector.normalize();
        }
        Ok(vector)
    }

    /// Number of terms in the trained vocabulary.
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether `train` has run.
    pub fn is_trained(&self) -> bool {
        self.is_trained
    }

    /// Get the configuration.
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

impl Embedder for TfIdfEmbedder {
    fn encode(&self, text: &str) -> Result<Vector> {
        self.embed(text)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_embedder() -> TfIdfEmbedder {
        let mut embedder = TfIdfEmbedder::new(EmbeddingConfig::default());
        embedder.train(&[
            "the quick brown fox jumps over the lazy dog",
            "operating temperature ranges from minus ten to sixty",
            "the fox likes high temperature environments",
        ]);
        embedder
    }

    #[test]
    fn test_train_builds_vocabulary() {
        let embedder = trained_embedder();
        assert!(embedder.is_trained());
        assert!(embedder.vocab_size() > 0);
    }

    #[test]
    fn test_embed_untrained_fails() {
        let embedder = TfIdfEmbedder::new(EmbeddingConfig::default());
        assert!(embedder.embed("anything").is_err());
    }

    #[test]
    fn test_embed_dimension_and_normalization() {
        let embedder = trained_embedder();
        let vector = embedder.embed("the fox and the temperature").unwrap();
        assert_eq!(vector.dimension(), 128);
        assert!((vector.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_embed_is_deterministic() {
        let embedder = trained_embedder();
        let a = embedder.embed("fox temperature").unwrap();
        let b = embedder.embed("fox temperature").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_retraining_reproduces_vectors() {
        let a = trained_embedder().embed("lazy fox").unwrap();
        let b = trained_embedder().embed("lazy fox").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_terms_embed_to_zero() {
        let embedder = trained_embedder();
        let vector = embedder.embed("zyzzyva qwertyuiop").unwrap();
        assert!(vector.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_min_term_freq_filters_vocabulary() {
        let config = EmbeddingConfig {
            min_term_freq: 2,
            ..Default::default()
        };
        let mut embedder = TfIdfEmbedder::new(config);
        embedder.train(&["alpha beta", "alpha gamma"]);
        // "alpha" appears in both documents, "beta"/"gamma" in one each.
        assert_eq!(embedder.vocab_size(), 1);
    }

    #[test]
    fn test_max_vocab_size_truncates() {
        let config = EmbeddingConfig {
            max_vocab_size: 2,
            ..Default::default()
        };
        let mut embedder = TfIdfEmbedder::new(config);
        embedder.train(&["one two three four five"]);
        assert_eq!(embedder.vocab_size(), 2);
    }

    #[test]
    fn test_serde_roundtrip_preserves_encoding() {
        let embedder = trained_embedder();
        let expected = embedder.embed("quick brown temperature").unwrap();

        let json = serde_json::to_string(&embedder).unwrap();
        let restored: TfIdfEmbedder = serde_json::from_str(&json).unwrap();
        let actual = restored.embed("quick brown temperature").unwrap();
        assert_eq!(actual, expected);
    }
}
