//! Distance metrics for the semantic retrieval channel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{KontosError, Result};

/// How stored embeddings are compared against a query vector.
///
/// Every metric here yields non-negative distances, so the ranking
/// similarity transform `1 / (1 + distance)` always lands in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine distance (1 - cosine similarity)
    #[default]
    Cosine,
    /// Euclidean (L2) distance
    Euclidean,
    /// Manhattan (L1) distance
    Manhattan,
}

impl DistanceMetric {
    /// Distance between `a` and `b` under this metric.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(KontosError::invalid_argument(format!(
                "Vector dimensions must match for distance calculation: {} vs {}",
                a.len(),
                b.len()
            )));
        }

        let result = match self {
            DistanceMetric::Cosine => {
                let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

                if norm_a == 0.0 || norm_b == 0.0 {
                    // A zero vector is maximally distant from everything.
                    1.0
                } else {
                    (1.0 - (dot_product / (norm_a * norm_b))).max(0.0)
                }
            }
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f32>()
                .sqrt(),
            DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
        };

        Ok(result)
    }

    /// Stable lowercase name, the inverse of [`DistanceMetric::parse_str`].
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
        }
    }

    /// Parse a metric name, accepting the `l1`/`l2` aliases.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            _ => Err(KontosError::invalid_argument(format!(
                "Unknown distance metric: {s}"
            ))),
        }
    }

    /// Score `query` against many stored vectors, parallelizing large batches.
    pub fn batch_distance_parallel(&self, query: &[f32], vectors: &[&[f32]]) -> Result<Vec<f32>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        if vectors.len() < 100 {
            return vectors
                .iter()
                .map(|v| self.distance(query, v))
                .collect::<Result<Vec<_>>>();
        }

        vectors
            .par_iter()
            .map(|v| self.distance(query, v))
            .collect::<Result<Vec<_>>>()
    }
}

/// Convert a distance into a ranking similarity score.
///
/// Monotonically decreasing in distance, so higher always means more
/// relevant, and bounded to (0, 1] so the value is directly comparable with
/// normalized lexical scores.
pub fn ranking_similarity(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}
