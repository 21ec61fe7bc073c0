//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators. Implementations live in other crates.

use crate::EnrichedRecord;

/// Trait for text-generation provider operations
///
/// Implemented by the infrastructure layer (voc-llm). Calls are synchronous:
/// one prompt in, one complete reply out, no streaming.
pub trait LlmProvider {
    /// Error type for provider operations
    type Error;

    /// Generate a completion for the prompt
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for persisting enriched records
///
/// Implemented by the storage layer (voc-store). Implementations are
/// responsible for deduplicating by `review_id`.
pub trait RecordSink {
    /// Error type for sink operations
    type Error;

    /// Persist records, returning how many were newly written
    fn persist(&mut self, records: &[EnrichedRecord]) -> Result<usize, Self::Error>;
}
