//! Weighted union merge of lexical and semantic hit sets.

use ahash::AHashMap;

use crate::lexical::LexicalHit;
use crate::retrieval::config::RetrievalConfig;

/// A semantic search hit with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticHit {
    /// Stable chunk id.
    pub chunk_id: u64,
    /// Ranking similarity in (0, 1].
    pub score: f32,
}

/// A fused candidate carrying both channel scores.
///
/// Channel scores default to 0 for candidates only one channel reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Stable chunk id.
    pub chunk_id: u64,
    /// Normalized lexical score in [0, 1].
    pub lexical_score: f32,
    /// Semantic similarity in [0, 1].
    pub semantic_score: f32,
    /// Weighted combination of the two, in [0, 1].
    pub fused_score: f32,
}

impl ScoredCandidate {
    /// Create a candidate with all scores zero.
    pub fn new(chunk_id: u64) -> Self {
        Self {
            chunk_id,
            lexical_score: 0.0,
            semantic_score: 0.0,
            fused_score: 0.0,
        }
    }

    /// Set the lexical score.
    pub fn with_lexical_score(mut self, score: f32) -> Self {
        self.lexical_score = score;
        self
    }

    /// Set the semantic score.
    pub fn with_semantic_score(mut self, score: f32) -> Self {
        self.semantic_score = score;
        self
    }
}

/// Merges per-channel hit sets into one ranked candidate list.
pub struct ScoreFusion {
    config: RetrievalConfig,
}

impl ScoreFusion {
    /// Create a new fusion stage.
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Number of candidates to request from each channel for a final `k`.
    pub fn overfetch_count(&self, k: usize) -> usize {
        (k as f32 * self.config.overfetch_factor).round() as usize
    }

    /// Merge both channels' hits into the top `k` fused candidates.
    ///
    /// The union of chunk ids is scored as
    /// `fused = lexical_weight * lexical + semantic_weight * semantic`,
    /// with a missing channel contributing 0. Ordering is fused score
    /// descending; equal scores fall back to ascending chunk id, which is
    /// first-appearance order in the corpus, so identical inputs always
    /// produce identical output.
    pub fn merge(
        &self,
        lexical_hits: &[LexicalHit],
        semantic_hits: &[SemanticHit],
        k: usize,
    ) -> Vec<ScoredCandidate> {
        let mut result_map: AHashMap<u64, ScoredCandidate> = AHashMap::new();

        for hit in lexical_hits {
            result_map.insert(
                hit.chunk_id,
                ScoredCandidate::new(hit.chunk_id).with_lexical_score(hit.score),
            );
        }

        for hit in semantic_hits {
            if let Some(existing) = result_map.get_mut(&hit.chunk_id) {
                existing.semantic_score = hit.score;
            } else {
                result_map.insert(
                    hit.chunk_id,
                    ScoredCandidate::new(hit.chunk_id).with_semantic_score(hit.score),
                );
            }
        }

        for candidate in result_map.values_mut() {
            candidate.fused_score = candidate.lexical_score * self.config.lexical_weight
                + candidate.semantic_score * self.config.semantic_weight;
        }

        let mut candidates: Vec<ScoredCandidate> = result_map.into_values().collect();
        candidates.sort_by(|a, b| {
            b.fused_score
                .partial_cmp(&a.fused_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        candidates.truncate(k);
        candidates
    }

    /// Degenerate mode: the lexical channel is disabled, so the semantic
    /// ranking passes through unchanged with no formula applied.
    pub fn passthrough(&self, semantic_hits: &[SemanticHit], k: usize) -> Vec<ScoredCandidate> {
        semantic_hits
            .iter()
            .take(k)
            .map(|hit| {
                let mut candidate =
                    ScoredCandidate::new(hit.chunk_id).with_semantic_score(hit.score);
                candidate.fused_score = hit.score;
                candidate
            })
            .collect()
    }

    /// The configuration this stage fuses with.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fusion() -> ScoreFusion {
        ScoreFusion::new(RetrievalConfig::default())
    }

    fn lexical(chunk_id: u64, score: f32) -> LexicalHit {
        LexicalHit { chunk_id, score }
    }

    fn semantic(chunk_id: u64, score: f32) -> SemanticHit {
        SemanticHit { chunk_id, score }
    }

    #[test]
    fn test_weighted_union_with_default_weights() {
        // One lexical-only candidate, one semantic-only candidate.
        let candidates = fusion().merge(&[lexical(0, 1.0)], &[semantic(1, 1.0)], 10);

        assert_eq!(candidates.len(), 2);
        // Semantic-only fuses to 0.7 and outranks lexical-only at 0.3.
        assert_eq!(candidates[0].chunk_id, 1);
        assert!((candidates[0].fused_score - 0.7).abs() < 1e-6);
        assert_eq!(candidates[1].chunk_id, 0);
        assert!((candidates[1].fused_score - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_overlapping_candidate_gets_both_components() {
        let candidates = fusion().merge(&[lexical(7, 0.5)], &[semantic(7, 0.8)], 10);

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.lexical_score, 0.5);
        assert_eq!(candidate.semantic_score, 0.8);
        assert!((candidate.fused_score - (0.3 * 0.5 + 0.7 * 0.8)).abs() < 1e-6);
    }

    #[test]
    fn test_fused_scores_stay_in_unit_range() {
        let lexical_hits: Vec<LexicalHit> = (0..20).map(|i| lexical(i, 1.0 / (i + 1) as f32)).collect();
        let semantic_hits: Vec<SemanticHit> =
            (10..30).map(|i| semantic(i, 1.0 / (i - 9) as f32)).collect();

        for candidate in fusion().merge(&lexical_hits, &semantic_hits, 30) {
            assert!(candidate.fused_score >= 0.0 && candidate.fused_score <= 1.0);
        }
    }

    #[test]
    fn test_ties_break_by_corpus_order() {
        let candidates = fusion().merge(
            &[lexical(9, 0.5), lexical(2, 0.5)],
            &[semantic(9, 0.5), semantic(2, 0.5)],
            10,
        );
        assert_eq!(candidates[0].chunk_id, 2);
        assert_eq!(candidates[1].chunk_id, 9);
    }

    #[test]
    fn test_merge_truncates_to_k() {
        let lexical_hits: Vec<LexicalHit> =
            (0..10).map(|i| lexical(i, 1.0 - i as f32 * 0.05)).collect();
        let candidates = fusion().merge(&lexical_hits, &[], 3);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].chunk_id, 0);
    }

    #[test]
    fn test_merge_is_deterministic() {
        let lexical_hits: Vec<LexicalHit> =
            (0..50).map(|i| lexical(i, ((i * 7) % 10) as f32 / 10.0)).collect();
        let semantic_hits: Vec<SemanticHit> =
            (25..75).map(|i| semantic(i, ((i * 3) % 10) as f32 / 10.0)).collect();

        let first = fusion().merge(&lexical_hits, &semantic_hits, 20);
        let second = fusion().merge(&lexical_hits, &semantic_hits, 20);
        assert_eq!(first, second);
    }

    #[test]
    fn test_overfetch_count_rounds() {
        let stage = fusion();
        assert_eq!(stage.overfetch_count(3), 9);
        assert_eq!(stage.overfetch_count(1), 3);

        let stage = ScoreFusion::new(RetrievalConfig {
            overfetch_factor: 2.5,
            ..Default::default()
        });
        assert_eq!(stage.overfetch_count(3), 8);
    }

    #[test]
    fn test_passthrough_preserves_semantic_order() {
        let semantic_hits = vec![semantic(4, 0.9), semantic(0, 0.6), semantic(2, 0.4)];
        let candidates = fusion().passthrough(&semantic_hits, 2);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].chunk_id, 4);
        assert_eq!(candidates[0].fused_score, 0.9);
        assert_eq!(candidates[0].lexical_score, 0.0);
        assert_eq!(candidates[1].chunk_id, 0);
    }
}
