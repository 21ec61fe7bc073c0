//! Groq Provider Implementation
//!
//! Talks to Groq's OpenAI-compatible chat completions endpoint.
//!
//! # Features
//!
//! - Async HTTP communication with `reqwest`
//! - Configurable endpoint, model and API key source
//! - Retry logic with exponential backoff for transport errors, 5xx and 429
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use voc_llm::{GroqConfig, GroqProvider};
//!
//! // Reads the key from GROQ_API_KEY
//! let provider = GroqProvider::from_config(&GroqConfig::default()).unwrap();
//!
//! // `generate` is async; the `LlmProvider` trait offers a blocking wrapper
//! // intended for `spawn_blocking` contexts.
//! ```

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use voc_domain::traits::LlmProvider as LlmProviderTrait;

/// Default Groq API base
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Environment variable holding the API key by default
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Groq provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroqConfig {
    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable that holds the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Groq chat completions provider
#[derive(Debug, Clone)]
pub struct GroqProvider {
    api_base: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl GroqProvider {
    /// Create a new Groq provider
    ///
    /// # Parameters
    ///
    /// - `api_base`: API base (e.g., "https://api.groq.com/openai/v1")
    /// - `model`: Model to use (e.g., "llama-3.3-70b-versatile")
    /// - `api_key`: Bearer token
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::build(
            api_base.into(),
            model.into(),
            api_key.into(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider from configuration, reading the key from the environment
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the key variable is unset or empty.
    pub fn from_config(config: &GroqConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LlmError::Configuration(format!("{} is not set", config.api_key_env))
            })?;

        let provider = Self::build(
            config.api_base.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(provider.with_max_retries(config.max_retries))
    }

    fn build(
        api_base: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Model this provider sends requests to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a completion for a single user message
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The API cannot be reached after all attempts
    /// - The model is not available (404)
    /// - The API keeps rate limiting (429) after all attempts
    /// - The reply has no message content
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.send_once(prompt).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() => {
                    warn!("Groq request attempt {} failed: {}", attempts + 1, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::Communication("Max retries exceeded".to_string())
        }))
    }

    async fn send_once(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("POST {} (model {}, prompt {} chars)", url, self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("HTTP {}: {}", status, error_text);
            return Err(if status.is_server_error() {
                LlmError::Communication(message)
            } else {
                LlmError::InvalidResponse(message)
            });
        }

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response has no message content".to_string()))
    }
}

impl LlmProviderTrait for GroqProvider {
    type Error = LlmError;

    /// Blocking wrapper around [`GroqProvider::generate`].
    ///
    /// Must not be called from inside an async task; run it through
    /// `tokio::task::spawn_blocking` when a runtime is active.
    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle.block_on(GroqProvider::generate(self, prompt)),
            Err(_) => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmError::Other(format!("Runtime error: {}", e)))?
                .block_on(GroqProvider::generate(self, prompt)),
        }
    }
}
