//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Analysis could not start
    #[error(transparent)]
    Analyzer(#[from] voc_analyzer::AnalyzerError),

    /// Provider setup failed
    #[error(transparent)]
    Llm(#[from] voc_llm::LlmError),

    /// Review collection failed
    #[error(transparent)]
    Collector(#[from] voc_collector::CollectorError),

    /// Storage failed
    #[error(transparent)]
    Store(#[from] voc_store::StoreError),

    /// Briefing delivery failed
    #[error(transparent)]
    Reporter(#[from] voc_reporter::ReporterError),
}
