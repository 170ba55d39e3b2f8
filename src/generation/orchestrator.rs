//! Generation orchestration with deterministic fallback.
//!
//! The orchestrator owns the configured primary backend plus an extractive
//! fallback, and guarantees that every call produces an answer: zero
//! retrieved contexts short-circuit to a canned reply, and any primary
//! failure (error, empty answer, or deadline) routes to the fallback.

use std::time::Duration;

use log::warn;

use crate::generation::NOT_FOUND_ANSWER;
use crate::generation::config::GenerationConfig;
use crate::generation::extractive::ExtractiveBackend;
use crate::generation::types::{BackendError, GenerationBackend, GenerationRequest};
use crate::retrieval::RetrievedChunk;

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationRoute {
    /// The primary backend answered.
    Primary,
    /// The primary backend failed and the extractive fallback answered.
    Fallback,
    /// No contexts were retrieved; the canned reply was returned without
    /// invoking any backend.
    ShortCircuit,
}

impl GenerationRoute {
    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            GenerationRoute::Primary => "primary",
            GenerationRoute::Fallback => "fallback",
            GenerationRoute::ShortCircuit => "short_circuit",
        }
    }
}

/// The answer text together with the route that produced it.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The generated answer.
    pub answer: String,
    /// Which path produced the answer.
    pub route: GenerationRoute,
}

/// Drives the primary backend and falls back to extraction on any failure.
#[derive(Debug)]
pub struct GenerationOrchestrator {
    primary: GenerationBackend,
    fallback: ExtractiveBackend,
    timeout: Duration,
}

impl GenerationOrchestrator {
    /// Builds an orchestrator around the backend named by the configuration.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, BackendError> {
        Ok(GenerationOrchestrator {
            primary: GenerationBackend::from_config(config)?,
            fallback: ExtractiveBackend::new(),
            timeout: config.timeout(),
        })
    }

    /// Returns the name of the primary backend.
    pub fn backend_name(&self) -> &'static str {
        self.primary.name()
    }

    /// Produces an answer for the prompt. Never fails.
    ///
    /// The deadline covers the whole primary call; the remote backend's own
    /// HTTP timeout usually fires first, this one also catches non-transport
    /// stalls.
    pub async fn generate(&self, prompt: &str, contexts: &[RetrievedChunk]) -> GenerationOutcome {
        if contexts.is_empty() {
            return GenerationOutcome {
                answer: NOT_FOUND_ANSWER.to_string(),
                route: GenerationRoute::ShortCircuit,
            };
        }

        let request = GenerationRequest::new(prompt, contexts);
        match tokio::time::timeout(self.timeout, self.primary.generate(&request)).await {
            Ok(Ok(answer)) if !answer.trim().is_empty() => GenerationOutcome {
                answer,
                route: GenerationRoute::Primary,
            },
            Ok(Ok(_)) => {
                warn!(
                    "generation backend '{}' returned an empty answer, falling back to extractive",
                    self.primary.name()
                );
                self.fall_back(&request)
            }
            Ok(Err(e)) => {
                warn!(
                    "generation backend '{}' failed, falling back to extractive: {}",
                    self.primary.name(),
                    e
                );
                self.fall_back(&request)
            }
            Err(_) => {
                warn!(
                    "generation backend '{}' timed out after {:?}, falling back to extractive",
                    self.primary.name(),
                    self.timeout
                );
                self.fall_back(&request)
            }
        }
    }

    fn fall_back(&self, request: &GenerationRequest<'_>) -> GenerationOutcome {
        GenerationOutcome {
            answer: self.fallback.generate(request),
            route: GenerationRoute::Fallback,
        }
    }
}
