use std::sync::Arc;

use kontos::citation::CitationEnforcer;
use kontos::corpus::ChunkRecord;
use kontos::embedding::{EmbeddingConfig, TfIdfEmbedder};
use kontos::engine::{AnswerEngine, EngineConfig};
use kontos::generation::{BackendKind, NOT_FOUND_ANSWER};
use kontos::vector::{DistanceMetric, FlatVectorIndex, IndexArtifact};

#[tokio::test]
async fn ask_returns_cited_answer_with_sources() {
    let engine = build_engine(manual_corpus(), EngineConfig::default());

    let result = engine
        .ask("What is the operating temperature range?", None)
        .await;

    assert!(!result.sources.is_empty());
    assert_eq!(result.question, "What is the operating temperature range?");
    assert!(CitationEnforcer::new().has_citation(&result.answer));
    for source in &result.sources {
        assert!(source.snippet.chars().count() <= 200);
    }
}

#[tokio::test]
async fn single_chunk_corpus_cites_its_page() {
    let records = vec![ChunkRecord::new(
        "Operating temperature: -10C to 60C",
        Some(5),
        "manual.pdf",
    )];
    let engine = build_engine(records, EngineConfig::default());

    let result = engine.ask("What is the operating range?", Some(1)).await;

    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].page, Some(5));
    assert!(result.answer.to_lowercase().contains("page 5"));
    assert!(result.answer.contains("-10C"));
    assert!(result.answer.contains("60C"));
}

#[test]
fn query_matching_both_channels_outranks_single_channel() {
    let records = vec![
        ChunkRecord::new(
            "The warranty covers manufacturing defects for two years.",
            Some(9),
            "manual.pdf",
        ),
        ChunkRecord::new(
            "Installation requires a torque wrench set to 12 Nm.",
            Some(2),
            "manual.pdf",
        ),
    ];
    let engine = build_engine(records, EngineConfig::default());

    let hits = engine.search("torque wrench installation", Some(2));
    assert!(!hits.is_empty());
    assert!(hits[0].content.contains("torque wrench"));
}

#[test]
fn ranking_is_deterministic_across_engine_builds() {
    let first = build_engine(manual_corpus(), EngineConfig::default());
    let second = build_engine(manual_corpus(), EngineConfig::default());

    for query in ["operating temperature", "maximum load", "cleaning"] {
        let a = first.search(query, Some(4));
        let b = second.search(query, Some(4));
        assert_eq!(a.len(), b.len(), "hit count differs for {query:?}");
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.content, y.content);
            assert_eq!(x.score, y.score);
        }
    }
}

#[test]
fn fused_scores_stay_in_unit_interval() {
    let engine = build_engine(manual_corpus(), EngineConfig::default());

    for query in [
        "operating temperature range",
        "maximum shelf load",
        "unrelated nonsense zzz",
    ] {
        for hit in engine.search(query, Some(6)) {
            assert!(
                (0.0..=1.0).contains(&hit.score),
                "score {} out of range for {query:?}",
                hit.score
            );
        }
    }
}

#[test]
fn k_larger_than_corpus_returns_all_chunks() {
    let engine = build_engine(manual_corpus(), EngineConfig::default());

    let hits = engine.search("documentation", Some(50));
    assert!(hits.len() <= 6);

    let limited = engine.search("documentation", Some(2));
    assert!(limited.len() <= 2);
}

#[tokio::test]
async fn empty_corpus_short_circuits_to_canned_answer() {
    let engine = AnswerEngine::with_index(
        Arc::new(FlatVectorIndex::new(DistanceMetric::Cosine, 16)),
        Arc::new(TfIdfEmbedder::new(EmbeddingConfig {
            dimension: 16,
            ..Default::default()
        })),
        EngineConfig::default(),
    )
    .unwrap();

    let result = engine.ask("Anything at all?", None).await;
    assert_eq!(result.answer, NOT_FOUND_ANSWER);
    assert!(result.sources.is_empty());

    assert!(engine.search("anything", None).is_empty());
}

#[tokio::test]
async fn ask_never_fails_even_for_nonsense_queries() {
    let engine = build_engine(manual_corpus(), EngineConfig::default());

    let result = engine.ask("zzz qqq xyzzy plugh", Some(3)).await;
    assert!(!result.answer.is_empty());
}

#[tokio::test]
async fn unreachable_remote_backend_degrades_to_extraction() {
    let mut config = EngineConfig::default();
    config.generation.backend = BackendKind::Ollama;
    config.generation.base_url = Some("http://127.0.0.1:9".to_string());
    config.generation.timeout_secs = 1;

    let engine = build_engine(manual_corpus(), config);
    let result = engine.ask("What is the maximum load?", Some(2)).await;

    assert!(result.answer.starts_with("Based on the indexed documentation:"));
    assert!(!result.sources.is_empty());
    assert!(CitationEnforcer::new().has_citation(&result.answer));
}

#[tokio::test]
async fn search_and_ask_agree_on_ranking() {
    let engine = build_engine(manual_corpus(), EngineConfig::default());

    let hits = engine.search("operating temperature", Some(3));
    let result = engine.ask("operating temperature", Some(3)).await;

    assert_eq!(hits.len(), result.sources.len());
    for (hit, source) in hits.iter().zip(result.sources.iter()) {
        assert_eq!(hit.page, source.page);
        assert_eq!(hit.score, source.score);
    }
}

#[test]
fn stats_report_corpus_shape() {
    let engine = build_engine(manual_corpus(), EngineConfig::default());
    let stats = engine.stats();

    assert_eq!(stats.chunk_count, 6);
    assert_eq!(stats.dimension, 64);
    assert!(stats.lexical_enabled);
    assert_eq!(stats.backend, "extractive");
}

/// A small product manual, one chunk per passage.
fn manual_corpus() -> Vec<ChunkRecord> {
    vec![
        ChunkRecord::new(
            "Operating temperature: -10C to 60C. Keep away from direct sunlight.",
            Some(5),
            "manual.pdf",
        ),
        ChunkRecord::new(
            "The maximum supported load is 150 kg per shelf.",
            Some(7),
            "manual.pdf",
        ),
        ChunkRecord::new(
            "Installation requires two people and a torque wrench set to 12 Nm.",
            Some(2),
            "manual.pdf",
        ),
        ChunkRecord::new(
            "Clean the surface with a dry cloth. Do not use solvents.",
            Some(8),
            "manual.pdf",
        ),
        ChunkRecord::new(
            "The warranty covers manufacturing defects for two years.",
            Some(9),
            "manual.pdf",
        ),
        ChunkRecord::new(
            "Storage humidity must stay below 80 percent.",
            Some(6),
            "manual.pdf",
        ),
    ]
}

fn build_engine(records: Vec<ChunkRecord>, config: EngineConfig) -> AnswerEngine {
    let artifact = IndexArtifact::build(
        records,
        EmbeddingConfig {
            dimension: 64,
            ..Default::default()
        },
        DistanceMetric::Cosine,
    )
    .expect("artifact builds");

    AnswerEngine::with_index(
        Arc::new(artifact.index),
        Arc::new(artifact.embedder),
        config,
    )
    .expect("engine builds")
}
