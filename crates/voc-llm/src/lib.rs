//! Voc LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `voc-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted replies for testing
//! - `GroqProvider`: Groq's OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use voc_llm::MockProvider;
//! use voc_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("[]");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "[]");
//! ```

#![warn(missing_docs)]

pub mod groq;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use voc_domain::traits::LlmProvider as LlmProviderTrait;

pub use groq::{GroqConfig, GroqProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider is misconfigured (missing key, bad client settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

/// One scripted reply
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

/// Mock LLM provider for deterministic testing
///
/// Replies are resolved in this order: the next queued reply (see
/// [`MockProvider::push_reply`]), then an exact prompt match, then the default
/// response. Every prompt received is recorded.
///
/// # Examples
///
/// ```
/// use voc_llm::MockProvider;
/// use voc_domain::traits::LlmProvider;
///
/// let provider = MockProvider::default();
/// provider.push_reply("first");
/// provider.push_error("provider down");
///
/// assert_eq!(provider.generate("a").unwrap(), "first");
/// assert!(provider.generate("b").is_err());
/// assert_eq!(provider.generate("c").unwrap(), "[]");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Queue a reply for the next call, ahead of prompt matches and the default
    pub fn push_reply(&self, response: impl Into<String>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(MockReply::Text(response.into()));
    }

    /// Queue a failure for the next call
    pub fn push_error(&self, message: impl Into<String>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(MockReply::Error(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        self.prompts.lock().unwrap().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(reply) = self.queue.lock().unwrap().pop_front() {
            return match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Error(message) => Err(LlmError::Other(message)),
            };
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}
