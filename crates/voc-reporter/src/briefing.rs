//! Plain-text daily briefing

use crate::comment::AiComment;
use crate::risk::GameStats;
use chrono::NaiveDate;
use voc_domain::EnrichedRecord;

/// Issue text length in the briefing
const BRIEFING_ISSUE_CHARS: usize = 50;

/// `"{n}. [game · category] text"`, with the text cut to `max_chars`.
///
/// Uses the summary, or the review text when the summary is empty.
pub fn issue_line(position: usize, record: &EnrichedRecord, max_chars: usize) -> String {
    let text = if record.analysis.summary.is_empty() {
        &record.record.review_text
    } else {
        &record.analysis.summary
    };
    format!(
        "{}. [{} · {}] {}",
        position + 1,
        record.record.game,
        record.analysis.category,
        text.chars().take(max_chars).collect::<String>()
    )
}

/// Render the briefing message
pub fn build_briefing(
    date: NaiveDate,
    stats: &[GameStats],
    urgent: &[&EnrichedRecord],
    comment: Option<&AiComment>,
) -> String {
    let risk_lines = stats
        .iter()
        .map(|s| format!("• {} ({}): {} {}", s.label, s.genre, s.risk.emoji(), s.risk))
        .collect::<Vec<_>>()
        .join("\n");

    let issue_lines = if urgent.is_empty() {
        "해당 없음".to_string()
    } else {
        urgent
            .iter()
            .enumerate()
            .map(|(i, r)| issue_line(i, r, BRIEFING_ISSUE_CHARS))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut parts = vec![
        format!("🎮 게임 VOC 일일 브리핑 | {}", date.format("%Y-%m-%d")),
        String::new(),
        "📊 위험등급".to_string(),
        risk_lines,
        String::new(),
        "🚨 긴급도 5 이슈 Top3".to_string(),
        issue_lines,
    ];

    if let Some(comment) = comment {
        if !comment.comment.is_empty() {
            parts.extend([String::new(), "🤖 AI 코멘트".to_string(), comment.comment.clone()]);
        }
        if !comment.actions.is_empty() {
            parts.extend([String::new(), "💡 권장 액션".to_string(), comment.actions_text()]);
        }
    }

    parts.join("\n")
}
