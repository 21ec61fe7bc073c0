//! Urgent and top issue selection

use serde::Serialize;
use std::collections::BTreeMap;
use voc_domain::{EnrichedRecord, MAX_PRIORITY};

/// The most pressing review for one (game, category) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopIssue {
    /// Game key
    pub game: String,
    /// Issue category
    pub category: String,
    /// Priority of the selected review
    pub priority: u8,
    /// Summary of the selected review
    pub summary: String,
    /// Keywords of the selected review
    pub keywords: String,
}

/// The `n` most urgent reviews.
///
/// Priority-5 reviews, newest first. When there are none, every review
/// ordered by priority instead.
pub fn top_urgent(records: &[EnrichedRecord], n: usize) -> Vec<&EnrichedRecord> {
    let mut urgent: Vec<&EnrichedRecord> = records
        .iter()
        .filter(|r| r.analysis.priority == MAX_PRIORITY)
        .collect();

    if urgent.is_empty() {
        urgent = records.iter().collect();
        urgent.sort_by(|a, b| b.analysis.priority.cmp(&a.analysis.priority));
    } else {
        urgent.sort_by(|a, b| b.record.date.cmp(&a.record.date));
    }

    urgent.truncate(n);
    urgent
}

/// One issue per (game, category): the highest priority review, latest first
/// on ties.
///
/// Reviews without a category are left out. Sorted by game, then priority
/// descending.
pub fn top_issues(records: &[EnrichedRecord]) -> Vec<TopIssue> {
    let mut best: BTreeMap<(&str, &str), &EnrichedRecord> = BTreeMap::new();

    for record in records.iter().filter(|r| !r.analysis.category.is_empty()) {
        let key = (record.record.game.as_str(), record.analysis.category.as_str());
        best.entry(key)
            .and_modify(|current| {
                let rank = (record.analysis.priority, &record.record.date);
                if rank > (current.analysis.priority, &current.record.date) {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut issues: Vec<TopIssue> = best
        .into_values()
        .map(|r| TopIssue {
            game: r.record.game.clone(),
            category: r.analysis.category.clone(),
            priority: r.analysis.priority,
            summary: r.analysis.summary.clone(),
            keywords: r.analysis.keywords.clone(),
        })
        .collect();

    issues.sort_by(|a, b| a.game.cmp(&b.game).then(b.priority.cmp(&a.priority)));
    issues
}
