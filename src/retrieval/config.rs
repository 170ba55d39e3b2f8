//! Configuration for hybrid retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{KontosError, Result};

/// Configuration for fusing lexical and semantic retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Weight for lexical (BM25) scores (0.0-1.0).
    pub lexical_weight: f32,
    /// Weight for semantic (vector similarity) scores (0.0-1.0).
    pub semantic_weight: f32,
    /// Per-channel over-fetch multiplier applied to `k` before fusing.
    pub overfetch_factor: f32,
    /// Result count used when a query does not request one.
    pub default_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            lexical_weight: 0.3,
            semantic_weight: 0.7,
            overfetch_factor: 3.0,
            default_k: 3,
        }
    }
}

impl RetrievalConfig {
    /// Validate the configuration.
    ///
    /// Weights must be non-negative and sum to 1 so fused scores stay in
    /// [0, 1]; the over-fetch factor must not shrink the candidate pool
    /// below `k`.
    pub fn validate(&self) -> Result<()> {
        if self.lexical_weight < 0.0 || self.semantic_weight < 0.0 {
            return Err(KontosError::config(format!(
                "retrieval weights must be non-negative: lexical={}, semantic={}",
                self.lexical_weight, self.semantic_weight
            )));
        }
        let sum = self.lexical_weight + self.semantic_weight;
        if (sum - 1.0).abs() > 1e-3 {
            return Err(KontosError::config(format!(
                "retrieval weights must sum to 1, got {sum}"
            )));
        }
        if self.overfetch_factor < 1.0 {
            return Err(KontosError::config(format!(
                "overfetch_factor must be >= 1, got {}",
                self.overfetch_factor
            )));
        }
        if self.default_k == 0 {
            return Err(KontosError::config("default_k must be >= 1"));
        }
        Ok(())
    }
}
