//! Voc Analyzer
//!
//! Enriches game review records with LLM analysis in rate-limited batches.
//!
//! # Overview
//!
//! Records are split into batches, each batch is rendered into one prompt,
//! the provider's reply is decoded into an array of analysis objects and those
//! are merged positionally back onto the records. Batches run strictly one at a
//! time, spaced by the configured request rate.
//!
//! # Architecture
//!
//! ```text
//! Records → batches → PromptBuilder → LLM → parse_response → RecordMerger → EnrichedRecords
//! ```
//!
//! # Failure handling
//!
//! A batch that fails at any stage (provider error, timeout, undecodable reply,
//! reply of the wrong length) does not fail the run: each of its records gets
//! the fallback analysis with `priority == 0`. The output therefore always has
//! one enriched record per input record, in input order.
//!
//! # Example Usage
//!
//! ```no_run
//! use voc_analyzer::{Analyzer, AnalyzerConfig};
//! use voc_domain::Record;
//! use voc_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"[{"category":"서버","sentiment":"부정","summary":"접속 불가","keywords":"서버","priority":5}]"#);
//! let analyzer = Analyzer::new(llm, AnalyzerConfig::default());
//!
//! let records = vec![Record {
//!     date: "2025-03-01".to_string(),
//!     game: "lineage_m".to_string(),
//!     genre: "MMORPG".to_string(),
//!     review_id: "gp:1".to_string(),
//!     rating: 1,
//!     review_text: "서버 접속이 안 돼요".to_string(),
//! }];
//!
//! let run = analyzer.analyze(&records).await?;
//! println!("{}", run.stats.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod batching;
mod config;
mod error;
mod merger;
mod parser;
mod prompt;
mod rate_limit;
mod types;


pub use analyzer::Analyzer;
pub use batching::{partition, Batch};
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use merger::{MergeOutput, RecordMerger};
pub use parser::{decode_reply, parse_response, strip_code_fence, RawAnalysis};
pub use prompt::PromptBuilder;
pub use rate_limit::RateLimiter;
pub use types::{AnalysisRun, BatchOutcome, BatchStage, BatchStatus, RunStats};
