//! Configuration for answer generation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{KontosError, Result};

/// Which generation backend the engine dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Local deterministic extraction from retrieved chunks.
    #[default]
    Extractive,
    /// Remote Ollama-style HTTP API (`/api/generate`).
    Ollama,
    /// Remote OpenAI-style chat completions API.
    #[serde(rename = "openai")]
    OpenAi,
}

impl BackendKind {
    /// Get the name of this backend kind.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Extractive => "extractive",
            BackendKind::Ollama => "ollama",
            BackendKind::OpenAi => "openai",
        }
    }

    /// Parse a backend kind from its string representation.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "extractive" | "mock" => Ok(BackendKind::Extractive),
            "ollama" => Ok(BackendKind::Ollama),
            "openai" => Ok(BackendKind::OpenAi),
            _ => Err(KontosError::invalid_argument(format!(
                "Unknown generation backend: {s}"
            ))),
        }
    }
}

/// Configuration for the generation stage.
///
/// Fixed at engine construction; per-query state never flows through here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Backend the orchestrator dispatches to first.
    pub backend: BackendKind,
    /// Model identifier passed to remote backends.
    pub model: String,
    /// Base URL for the remote API; defaults per backend kind when absent.
    pub base_url: Option<String>,
    /// API key for backends that authenticate.
    pub api_key: Option<String>,
    /// Wall-clock bound on one backend call, in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Extractive,
            model: "llama3.1".to_string(),
            base_url: None,
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl GenerationConfig {
    /// The per-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The base URL for remote calls, falling back to the kind's default.
    pub fn resolved_base_url(&self) -> String {
        let default = match self.backend {
            BackendKind::Ollama => "http://localhost:11434",
            BackendKind::OpenAi => "https://api.openai.com",
            BackendKind::Extractive => "",
        };
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenerationConfig::default();
        assert_eq!(config.backend, BackendKind::Extractive);
        assert_eq!(config.model, "llama3.1");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_backend_kind_names() {
        assert_eq!(BackendKind::Extractive.name(), "extractive");
        assert_eq!(BackendKind::Ollama.name(), "ollama");
        assert_eq!(BackendKind::OpenAi.name(), "openai");
    }

    #[test]
    fn test_resolved_base_url_defaults() {
        let config = GenerationConfig {
            backend: BackendKind::Ollama,
            ..Default::default()
        };
        assert_eq!(config.resolved_base_url(), "http://localhost:11434");

        let config = GenerationConfig {
            backend: BackendKind::OpenAi,
            ..Default::default()
        };
        assert_eq!(config.resolved_base_url(), "https://api.openai.com");
    }

    #[test]
    fn test_resolved_base_url_strips_trailing_slash() {
        let config = GenerationConfig {
            backend: BackendKind::Ollama,
            base_url: Some("http://10.0.0.5:11434/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_base_url(), "http://10.0.0.5:11434");
    }

    #[test]
    fn test_zero_timeout_clamps_to_one_second() {
        let config = GenerationConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_backend_kind_parse_str() {
        assert_eq!(
            BackendKind::parse_str("extractive").unwrap(),
            BackendKind::Extractive
        );
        assert_eq!(
            BackendKind::parse_str("mock").unwrap(),
            BackendKind::Extractive
        );
        assert_eq!(BackendKind::parse_str("Ollama").unwrap(), BackendKind::Ollama);
        assert_eq!(BackendKind::parse_str("openai").unwrap(), BackendKind::OpenAi);
        assert!(BackendKind::parse_str("gemini").is_err());
    }

    #[test]
    fn test_backend_kind_serde_names() {
        let json = serde_json::to_string(&BackendKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let kind: BackendKind = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(kind, BackendKind::Ollama);
    }
}
