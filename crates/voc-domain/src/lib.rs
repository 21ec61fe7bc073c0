//! Voc Domain Layer
//!
//! Core data model for the review enrichment pipeline. Every other crate in
//! the workspace depends on the types and trait boundaries defined here.
//!
//! ## Key Concepts
//!
//! - **Record**: one collected review, identified by `review_id`
//! - **AnalysisResult**: category, sentiment, summary, keywords and priority
//!   produced for a record
//! - **EnrichedRecord**: a record with its analysis merged in
//! - **Taxonomy**: the closed category and sentiment sets communicated to the
//!   provider and enforced on its replies
//! - **GameConfig**: one tracked app (store id, genre, display label)
//!
//! ## Architecture
//!
//! - Pure data and validation only; no I/O
//! - Trait definitions for the provider and persistence collaborators
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod game;
pub mod record;
pub mod taxonomy;
pub mod traits;

// Re-exports for convenience
pub use analysis::{
    AnalysisResult, EnrichedRecord, DEFAULT_PRIORITY, FAILED_PRIORITY, MAX_PRIORITY, MIN_PRIORITY,
};
pub use game::GameConfig;
pub use record::Record;
pub use taxonomy::{Taxonomy, DEFAULT_CATEGORIES, DEFAULT_SENTIMENTS};
