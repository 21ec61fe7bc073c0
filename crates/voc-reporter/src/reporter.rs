//! Briefing orchestration

use crate::briefing::build_briefing;
use crate::comment::CommentGenerator;
use crate::issues::top_urgent;
use crate::risk::game_stats;
use crate::telegram::TelegramNotifier;
use crate::ReporterError;
use chrono::NaiveDate;
use tracing::info;
use voc_domain::traits::LlmProvider;
use voc_domain::{EnrichedRecord, GameConfig};

/// Urgent issues listed in a briefing
const URGENT_ISSUES: usize = 3;

/// What `send_briefing` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BriefingOutcome {
    /// No analyzed records in the window, nothing built
    NoData,
    /// Built but not sent (no notifier configured)
    Built(String),
    /// Built and delivered
    Sent(String),
}

/// Builds the daily briefing and hands it to the notifier
pub struct Reporter<L>
where
    L: LlmProvider,
{
    comments: Option<CommentGenerator<L>>,
    notifier: Option<TelegramNotifier>,
}

impl<L> Reporter<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Reporter without AI comment or delivery
    pub fn new() -> Self {
        Self {
            comments: None,
            notifier: None,
        }
    }

    /// Add an AI comment section
    pub fn with_comments(mut self, comments: CommentGenerator<L>) -> Self {
        self.comments = Some(comments);
        self
    }

    /// Deliver briefings through `notifier`
    pub fn with_notifier(mut self, notifier: TelegramNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the briefing for `date` and send it if a notifier is configured.
    ///
    /// # Errors
    ///
    /// Only delivery errors; a failed AI comment is rendered into the message.
    pub async fn send_briefing(
        &self,
        records: &[EnrichedRecord],
        games: &[GameConfig],
        date: NaiveDate,
    ) -> Result<BriefingOutcome, ReporterError> {
        if records.is_empty() {
            info!("No analyzed reviews, skipping briefing");
            return Ok(BriefingOutcome::NoData);
        }

        let stats = game_stats(records, games);
        let urgent = top_urgent(records, URGENT_ISSUES);

        let comment = match &self.comments {
            Some(generator) => Some(generator.generate(&stats, &urgent).await),
            None => None,
        };

        let message = build_briefing(date, &stats, &urgent, comment.as_ref());

        match &self.notifier {
            Some(notifier) => {
                notifier.send(&message).await?;
                Ok(BriefingOutcome::Sent(message))
            }
            None => Ok(BriefingOutcome::Built(message)),
        }
    }
}

impl<L> Default for Reporter<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}
