//! Shared types for the generation backends.
//!
//! A [`GenerationBackend`] is selected once, at engine construction, from the
//! configured [`BackendKind`]. The enum is closed on purpose: the extractive
//! backend consumes the retrieved contexts directly rather than a prompt, so
//! the two variants do not share a uniform call shape behind a trait object.

use std::time::Duration;

use thiserror::Error;

use crate::generation::config::{BackendKind, GenerationConfig};
use crate::generation::extractive::ExtractiveBackend;
use crate::generation::remote::{RemoteApiFlavor, RemoteHttpBackend};
use crate::retrieval::RetrievedChunk;

/// Errors raised by a generation backend.
///
/// These never escape the orchestrator at query time: any variant routes the
/// query to the extractive fallback instead.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend could not be reached or the transport failed mid-flight.
    #[error("Connection failure: {0}")]
    Connection(String),

    /// The backend rejected our credentials, or none were configured.
    #[error("Authentication failure: {0}")]
    Auth(String),

    /// The backend did not answer within the configured deadline.
    #[error("Backend timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a payload that violates its wire contract.
    #[error("Unsupported backend response: {0}")]
    Unsupported(String),
}

/// A single generation call: the composed prompt plus the retrieved chunks
/// it was composed from.
///
/// Remote backends send only the prompt; the extractive backend reads the
/// contexts and ignores the prompt entirely.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// The fully composed prompt, contexts and instructions included.
    pub prompt: &'a str,
    /// The retrieved chunks the prompt embeds, in fused ranking order.
    pub contexts: &'a [RetrievedChunk],
}

impl<'a> GenerationRequest<'a> {
    /// Creates a request over a composed prompt and its source chunks.
    pub fn new(prompt: &'a str, contexts: &'a [RetrievedChunk]) -> Self {
        GenerationRequest { prompt, contexts }
    }
}

/// A generation backend selected at construction time.
#[derive(Debug)]
pub enum GenerationBackend {
    /// A remote HTTP API (Ollama or OpenAI-style chat completions).
    Remote(RemoteHttpBackend),
    /// The deterministic local extractive backend.
    Extractive(ExtractiveBackend),
}

impl GenerationBackend {
    /// Builds the backend named by the configuration.
    ///
    /// Remote variants validate their HTTP client eagerly so a broken setup
    /// fails here rather than on the first query.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, BackendError> {
        match config.backend {
            BackendKind::Extractive => {
                Ok(GenerationBackend::Extractive(ExtractiveBackend::default()))
            }
            BackendKind::Ollama => Ok(GenerationBackend::Remote(RemoteHttpBackend::from_config(
                RemoteApiFlavor::Ollama,
                config,
            )?)),
            BackendKind::OpenAi => Ok(GenerationBackend::Remote(RemoteHttpBackend::from_config(
                RemoteApiFlavor::OpenAiChat,
                config,
            )?)),
        }
    }

    /// Produces an answer for the request.
    pub async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendError> {
        match self {
            GenerationBackend::Remote(backend) => backend.generate(request).await,
            GenerationBackend::Extractive(backend) => Ok(backend.generate(request)),
        }
    }

    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            GenerationBackend::Remote(backend) => backend.flavor_name(),
            GenerationBackend::Extractive(_) => "extractive",
        }
    }
}
