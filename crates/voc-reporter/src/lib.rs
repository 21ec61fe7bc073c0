//! Voc Reporter
//!
//! Turns stored enriched reviews into a daily briefing: per-game risk levels,
//! the most urgent issues, an optional LLM-written comment, and delivery to a
//! Telegram chat.
//!
//! # Architecture
//!
//! ```text
//! EnrichedRecords → game_stats / top_urgent → CommentGenerator → build_briefing → TelegramNotifier
//! ```

#![warn(missing_docs)]

mod briefing;
mod comment;
mod issues;
mod reporter;
mod risk;
mod telegram;

use thiserror::Error;

pub use briefing::{build_briefing, issue_line};
pub use comment::{AiComment, CommentGenerator};
pub use issues::{top_issues, top_urgent, TopIssue};
pub use reporter::{BriefingOutcome, Reporter};
pub use risk::{calc_risk, game_stats, GameStats, RiskLevel};
pub use telegram::{TelegramConfig, TelegramNotifier};

/// Errors that can occur while reporting
#[derive(Error, Debug)]
pub enum ReporterError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The chat API answered but refused the message
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Reporter is misconfigured
    #[error("Configuration error: {0}")]
    Configuration(String),
}
