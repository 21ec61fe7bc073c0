//! Analysis results and enriched records

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Lowest urgency a successful analysis can carry
pub const MIN_PRIORITY: u8 = 1;

/// Highest urgency a successful analysis can carry
pub const MAX_PRIORITY: u8 = 5;

/// Urgency assumed when a reply item omits `priority` or it cannot be read
pub const DEFAULT_PRIORITY: u8 = 3;

/// Urgency marker for records whose batch failed and which were never scored
pub const FAILED_PRIORITY: u8 = 0;

/// Structured analysis of one review.
///
/// `priority == 0` is reserved for the failure fallback; a successful
/// analysis always carries a priority in `MIN_PRIORITY..=MAX_PRIORITY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Issue category, a member of the configured taxonomy or empty
    pub category: String,

    /// Review sentiment, a member of the configured taxonomy or empty
    pub sentiment: String,

    /// One or two sentence summary
    pub summary: String,

    /// Up to three comma-separated keywords
    pub keywords: String,

    /// Urgency 1-5, or 0 when unscored
    pub priority: u8,
}

impl AnalysisResult {
    /// The neutral result substituted for every record of a failed batch.
    ///
    /// # Examples
    ///
    /// ```
    /// use voc_domain::AnalysisResult;
    ///
    /// let fallback = AnalysisResult::fallback();
    /// assert!(fallback.is_fallback());
    /// assert_eq!(fallback.priority, 0);
    /// ```
    pub fn fallback() -> Self {
        Self {
            priority: FAILED_PRIORITY,
            ..Self::default()
        }
    }

    /// Whether this result marks an unscored record
    pub fn is_fallback(&self) -> bool {
        self.priority == FAILED_PRIORITY
    }
}

/// A record with its analysis merged in.
///
/// Serializes flat: the record's fields followed by the analysis fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// The original record, unchanged
    #[serde(flatten)]
    pub record: Record,

    /// Analysis for this record
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

impl EnrichedRecord {
    /// Merge an analysis onto a record
    pub fn new(record: Record, analysis: AnalysisResult) -> Self {
        Self { record, analysis }
    }

    /// Enrich a record with the failure fallback
    pub fn fallback(record: Record) -> Self {
        Self::new(record, AnalysisResult::fallback())
    }

    /// Records that were not scored should be queued for another run
    pub fn needs_reanalysis(&self) -> bool {
        self.analysis.is_fallback()
    }

    /// Shortcut for `record.review_id`
    pub fn review_id(&self) -> &str {
        &self.record.review_id
    }
}
