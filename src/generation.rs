//! Answer generation with guaranteed graceful degradation.
//!
//! Backends are a closed capability set selected once at engine
//! construction: a remote HTTP generator (Ollama-style or OpenAI-style wire
//! format) or the local deterministic extractive generator. The
//! orchestrator dispatches the configured primary under a wall-clock bound
//! and pattern-matches its result; any failure kind degrades to the
//! extractive fallback, so generation never propagates an error once at
//! least one chunk was retrieved.
//!
//! # Module Structure
//!
//! - `config`: Backend selection and remote settings
//! - `types`: Backend capability, request, and error kinds
//! - `remote`: HTTP backend for Ollama- and OpenAI-style APIs
//! - `extractive`: Deterministic local generator over retrieved chunks
//! - `orchestrator`: Primary dispatch, timeout, fallback policy

pub mod config;
pub mod extractive;
pub mod orchestrator;
pub mod remote;
pub mod types;

pub use self::config::{BackendKind, GenerationConfig};
pub use self::extractive::ExtractiveBackend;
pub use self::orchestrator::{GenerationOrchestrator, GenerationOutcome, GenerationRoute};
pub use self::remote::{RemoteApiFlavor, RemoteHttpBackend};
pub use self::types::{BackendError, GenerationBackend, GenerationRequest};

/// The canned answer returned when nothing relevant was retrieved.
pub const NOT_FOUND_ANSWER: &str =
    "No relevant information was found in the indexed documentation.";
