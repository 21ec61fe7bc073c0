//! Error types for the Analyzer

use thiserror::Error;

/// Errors that can occur during analysis
///
/// `Provider`, `Decode`, `LengthMismatch` and `Internal` are batch-scoped: the
/// analyzer catches them at the batch boundary and substitutes the fallback
/// result. `Config` aborts a run before any batch is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    /// The provider call failed or timed out
    #[error("Provider error: {0}")]
    Provider(String),

    /// The reply is not a JSON array of objects
    #[error("Decode error: {0}")]
    Decode(String),

    /// The reply has a different number of items than the batch
    #[error("Length mismatch: batch has {expected} records, reply has {actual} results")]
    LengthMismatch {
        /// Records in the batch
        expected: usize,
        /// Items in the reply
        actual: usize,
    },

    /// Unexpected failure inside the analyzer (panicked task, serialization)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Invalid analyzer configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
