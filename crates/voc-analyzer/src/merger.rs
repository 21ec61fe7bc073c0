//! Positional merge of reply items onto records

use crate::error::AnalyzerError;
use crate::parser::RawAnalysis;
use serde_json::Value;
use tracing::debug;
use voc_domain::{
    AnalysisResult, EnrichedRecord, Record, Taxonomy, DEFAULT_PRIORITY, MAX_PRIORITY,
    MIN_PRIORITY,
};

/// Records of one batch with their analysis merged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutput {
    /// Enriched records in batch order
    pub records: Vec<EnrichedRecord>,

    /// Reply fields that were defaulted or normalized
    pub coercion_warnings: usize,
}

/// Pairs reply items with batch records and normalizes their fields
pub struct RecordMerger<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> RecordMerger<'a> {
    /// Create a merger validating against `taxonomy`
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Merge `results[i]` onto `records[i]`.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if the counts differ; nothing is merged then.
    pub fn merge(
        &self,
        records: &[Record],
        results: Vec<RawAnalysis>,
    ) -> Result<MergeOutput, AnalyzerError> {
        if records.len() != results.len() {
            return Err(AnalyzerError::LengthMismatch {
                expected: records.len(),
                actual: results.len(),
            });
        }

        let mut coercion_warnings = 0;
        let merged = records
            .iter()
            .zip(results)
            .enumerate()
            .map(|(idx, (record, raw))| {
                let mut warnings = Coercions::new(idx);
                let analysis = self.coerce(&raw, &mut warnings);
                coercion_warnings += warnings.count;
                EnrichedRecord::new(record.clone(), analysis)
            })
            .collect();

        Ok(MergeOutput {
            records: merged,
            coercion_warnings,
        })
    }

    fn coerce(&self, raw: &RawAnalysis, warnings: &mut Coercions) -> AnalysisResult {
        let mut category = text_field(raw, "category", warnings);
        if !category.is_empty() && !self.taxonomy.has_category(&category) {
            warnings.note("category", &format!("'{}' is not a known category", category));
            category.clear();
        }

        let mut sentiment = text_field(raw, "sentiment", warnings);
        if !sentiment.is_empty() && !self.taxonomy.has_sentiment(&sentiment) {
            warnings.note("sentiment", &format!("'{}' is not a known sentiment", sentiment));
            sentiment.clear();
        }

        AnalysisResult {
            category,
            sentiment,
            summary: text_field(raw, "summary", warnings),
            keywords: text_field(raw, "keywords", warnings),
            priority: priority_field(raw, warnings),
        }
    }
}

/// Per-item coercion tally
struct Coercions {
    item: usize,
    count: usize,
}

impl Coercions {
    fn new(item: usize) -> Self {
        Self { item, count: 0 }
    }

    fn note(&mut self, field: &str, reason: &str) {
        self.count += 1;
        debug!("Item {} field '{}' coerced: {}", self.item, field, reason);
    }
}

fn text_field(raw: &RawAnalysis, field: &str, warnings: &mut Coercions) -> String {
    match raw.get(field) {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => {
            warnings.note(field, "missing, defaulted to empty");
            String::new()
        }
        Some(Value::Array(items)) => {
            warnings.note(field, "array joined");
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",")
        }
        Some(other) => {
            warnings.note(field, "non-string value rendered as text");
            other.to_string()
        }
    }
}

fn priority_field(raw: &RawAnalysis, warnings: &mut Coercions) -> u8 {
    let parsed = match raw.get("priority") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Some(i),
            None => {
                warnings.note("priority", "non-integer number truncated");
                n.as_f64().map(|f| f.trunc() as i64)
            }
        },
        Some(Value::String(s)) => {
            warnings.note("priority", "numeric string converted");
            parse_numeric(s)
        }
        _ => None,
    };

    match parsed {
        Some(value) => {
            let clamped = value.clamp(MIN_PRIORITY as i64, MAX_PRIORITY as i64);
            if clamped != value {
                warnings.note("priority", &format!("{} clamped to {}", value, clamped));
            }
            clamped as u8
        }
        None => {
            warnings.note("priority", "missing or unreadable, defaulted");
            DEFAULT_PRIORITY
        }
    }
}

fn parse_numeric(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}
