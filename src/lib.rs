//! # Kontos
//!
//! A hybrid retrieval and grounded answer engine for technical documentation.
//!
//! Kontos indexes a corpus of text chunks once, then answers questions
//! against it: BM25 lexical search and TF-IDF vector similarity run side by
//! side, their rankings are fused, and the selected chunks ground a
//! generated answer that always cites where it came from.
//!
//! ## Features
//!
//! - Hybrid retrieval: BM25 + vector similarity with weighted score fusion
//! - Single-file index artifact bundling embeddings with their embedder
//! - Pluggable generation: Ollama, OpenAI-style APIs, or local extraction
//! - Graceful degradation: queries never fail once an engine is built
//! - Enforced page citations on every sourced answer
//!
//! ## Quick Start
//!
//! ```no_run
//! use kontos::engine::{AnswerEngine, EngineConfig};
//!
//! # async fn example() -> kontos::error::Result<()> {
//! let engine = AnswerEngine::open("manual.idx", EngineConfig::default())?;
//! let result = engine.ask("What is the operating temperature?", None).await;
//! println!("{}", result.answer);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod citation;
pub mod cli;
pub mod corpus;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod lexical;
pub mod prompt;
pub mod retrieval;
pub mod vector;

pub use crate::engine::{AnswerEngine, AnswerResult, EngineConfig, EngineStats, SearchHit};
pub use crate::error::{KontosError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
