//! Configuration for the Analyzer

use serde::{Deserialize, Serialize};
use std::time::Duration;
use voc_domain::Taxonomy;

/// Configuration for the Analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Maximum records sent to the provider in one request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Provider request ceiling per minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Maximum time for a single provider call (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Closed category and sentiment sets
    #[serde(default)]
    pub taxonomy: Taxonomy,
}

fn default_batch_size() -> usize {
    10
}

// Groq free tier for llama-3.3-70b-versatile
fn default_requests_per_minute() -> u32 {
    30
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl AnalyzerConfig {
    /// Get the provider call timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.requests_per_minute == 0 {
            return Err("requests_per_minute must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        self.taxonomy.validate()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            requests_per_minute: default_requests_per_minute(),
            request_timeout_secs: default_request_timeout_secs(),
            taxonomy: Taxonomy::default(),
        }
    }
}
