//! Remote HTTP generation backends.
//!
//! Speaks two API dialects: Ollama's `/api/generate` endpoint and the
//! OpenAI-style `/v1/chat/completions` endpoint. Transport failures, HTTP
//! error statuses, and malformed payloads all map onto [`BackendError`] so
//! the orchestrator can route the query to the extractive fallback.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::generation::config::GenerationConfig;
use crate::generation::types::{BackendError, GenerationRequest};

/// Sampling temperature for grounded answering. Kept low so the model sticks
/// to the provided excerpts instead of improvising.
const GENERATION_TEMPERATURE: f32 = 0.1;

/// Nucleus sampling parameter sent to Ollama.
const GENERATION_TOP_P: f32 = 0.9;

/// System message for chat completion APIs.
const CHAT_SYSTEM_MESSAGE: &str = "You are a specialized technical assistant.";

/// Request structure for Ollama's generate API.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    /// Model identifier to generate with.
    model: &'a str,
    /// The fully composed prompt.
    prompt: &'a str,
    /// Always `false`: the answer must arrive as a single JSON body.
    stream: bool,
    /// Sampling options.
    options: OllamaOptions,
}

/// Sampling options for Ollama generation.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
}

/// Response structure from Ollama's generate API.
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    /// The generated completion text.
    response: String,
}

/// Request structure for OpenAI-style chat completions.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    /// Model identifier to generate with.
    model: &'a str,
    /// Conversation messages, system instruction first.
    messages: Vec<ChatMessage<'a>>,
    /// Sampling temperature.
    temperature: f32,
}

/// A single chat message.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response structure from OpenAI-style chat completions.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    /// Candidate completions; the first one is the answer.
    choices: Vec<ChatChoice>,
}

/// Individual completion choice from the API response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

/// The message payload of a completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Which remote HTTP API dialect to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteApiFlavor {
    /// Ollama's `/api/generate` endpoint.
    Ollama,
    /// OpenAI-style `/v1/chat/completions` endpoint.
    OpenAiChat,
}

/// A generation backend that calls a remote HTTP API.
pub struct RemoteHttpBackend {
    /// Shared HTTP client, connection pool included.
    client: Client,
    /// API dialect spoken by the remote endpoint.
    flavor: RemoteApiFlavor,
    /// Base URL of the remote endpoint, without a trailing slash.
    base_url: String,
    /// Model identifier passed through to the remote API.
    model: String,
    /// API key for authentication, if one is configured.
    api_key: Option<String>,
    /// Request deadline.
    timeout: Duration,
}

impl std::fmt::Debug for RemoteHttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHttpBackend")
            .field("flavor", &self.flavor)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteHttpBackend {
    /// Builds a backend for the given API flavor from the configuration.
    pub fn from_config(
        flavor: RemoteApiFlavor,
        config: &GenerationConfig,
    ) -> Result<Self, BackendError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(RemoteHttpBackend {
            client,
            flavor,
            base_url: config.resolved_base_url(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    /// Returns the short name of the API flavor for logging.
    pub fn flavor_name(&self) -> &'static str {
        match self.flavor {
            RemoteApiFlavor::Ollama => "ollama",
            RemoteApiFlavor::OpenAiChat => "openai",
        }
    }

    /// Produces an answer for the request by calling the remote API.
    pub async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendError> {
        match self.flavor {
            RemoteApiFlavor::Ollama => self.generate_ollama(request.prompt).await,
            RemoteApiFlavor::OpenAiChat => self.generate_openai(request.prompt).await,
        }
    }

    /// Calls Ollama's generate endpoint (internal implementation).
    async fn generate_ollama(&self, prompt: &str) -> Result<String, BackendError> {
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: GENERATION_TEMPERATURE,
                top_p: GENERATION_TOP_P,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let response = self.check_status(response).await?;
        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Unsupported(format!("malformed Ollama response: {}", e)))?;

        Ok(parsed.response.trim().to_string())
    }

    /// Calls an OpenAI-style chat completions endpoint (internal implementation).
    async fn generate_openai(&self, prompt: &str) -> Result<String, BackendError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(BackendError::Auth("no API key configured".to_string())),
        };

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: CHAT_SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: GENERATION_TEMPERATURE,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let response = self.check_status(response).await?;
        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            BackendError::Unsupported(format!("malformed chat completion response: {}", e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Unsupported("no choices in response".to_string()))?;

        Ok(choice.message.content.trim().to_string())
    }

    /// Maps a transport-level error onto the backend error taxonomy.
    fn map_transport_error(&self, error: reqwest::Error) -> BackendError {
        if error.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Connection(error.to_string())
        }
    }

    /// Converts a non-success status into an error, reading the body for context.
    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(BackendError::Auth(format!("HTTP {}: {}", status, text)))
        } else {
            Err(BackendError::Connection(format!(
                "{} returned HTTP {}: {}",
                self.flavor_name(),
                status,
                text
            )))
        }
    }
}
