//! Run and batch outcome types

use crate::error::AnalyzerError;
use std::fmt;
use voc_domain::EnrichedRecord;

/// Step a batch was in when it finished or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchStage {
    /// Serializing the batch into a prompt
    Building,
    /// Waiting on the provider
    Dispatching,
    /// Decoding the reply
    Parsing,
    /// Pairing reply items with records
    Merging,
}

impl BatchStage {
    /// Stage name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStage::Building => "building",
            BatchStage::Dispatching => "dispatching",
            BatchStage::Parsing => "parsing",
            BatchStage::Merging => "merging",
        }
    }
}

impl fmt::Display for BatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Reply merged onto every record
    Done,
    /// Every record received the fallback result
    Failed {
        /// Stage that raised the error
        stage: BatchStage,
        /// The error itself
        error: AnalyzerError,
    },
}

/// What happened to one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Batch position, 0-based
    pub index: usize,

    /// Offset of the batch's first record in the run input
    pub offset: usize,

    /// Records in the batch
    pub size: usize,

    /// Done or Failed
    pub status: BatchStatus,

    /// Reply fields that had to be defaulted or normalized
    pub coercion_warnings: usize,
}

impl BatchOutcome {
    /// Whether the batch merged successfully
    pub fn is_done(&self) -> bool {
        matches!(self.status, BatchStatus::Done)
    }
}

/// Aggregate counters for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records in the input
    pub total_records: usize,

    /// Batches dispatched
    pub batches: usize,

    /// Batches merged successfully
    pub succeeded: usize,

    /// Batches that fell back
    pub failed: usize,

    /// Records carrying the fallback result
    pub fallback_records: usize,

    /// Reply fields defaulted or normalized across all batches
    pub coercion_warnings: usize,

    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}

impl RunStats {
    /// One-line summary for logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "{} records in {} batches: {} ok, {} failed ({} records need reanalysis), {} coerced fields, {}ms",
            self.total_records,
            self.batches,
            self.succeeded,
            self.failed,
            self.fallback_records,
            self.coercion_warnings,
            self.elapsed_ms
        )
    }
}

/// Result of analyzing a full record set
///
/// `records` has exactly one entry per input record, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRun {
    /// Enriched records, in input order
    pub records: Vec<EnrichedRecord>,

    /// One outcome per batch, in dispatch order
    pub batches: Vec<BatchOutcome>,

    /// Aggregate counters
    pub stats: RunStats,
}

impl AnalysisRun {
    /// Batches that fell back
    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.batches.iter().filter(|b| !b.is_done())
    }

    /// Records that should be queued for another run
    pub fn needs_reanalysis(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.records.iter().filter(|r| r.needs_reanalysis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(BatchStage::Dispatching.to_string(), "dispatching");
        assert_eq!(BatchStage::Merging.as_str(), "merging");
    }

    #[test]
    fn test_outcome_is_done() {
        let mut outcome = BatchOutcome {
            index: 0,
            offset: 0,
            size: 3,
            status: BatchStatus::Done,
            coercion_warnings: 0,
        };
        assert!(outcome.is_done());

        outcome.status = BatchStatus::Failed {
            stage: BatchStage::Parsing,
            error: AnalyzerError::Decode("not json".to_string()),
        };
        assert!(!outcome.is_done());
    }

    #[test]
    fn test_summary_mentions_counts() {
        let stats = RunStats {
            total_records: 25,
            batches: 3,
            succeeded: 2,
            failed: 1,
            fallback_records: 5,
            coercion_warnings: 4,
            elapsed_ms: 10,
        };
        let summary = stats.summary();
        assert!(summary.starts_with("25 records in 3 batches"));
        assert!(summary.contains("5 records need reanalysis"));
    }
}
