//! Voc Collector
//!
//! Pages through store reviews newest-first and turns them into [`Record`]s,
//! stopping at a date cutoff.
//!
//! The page source is abstracted behind [`ReviewPager`] so the same collection
//! loop works against a live scraper or a directory of JSON dumps
//! ([`JsonDirPager`]).
//!
//! [`Record`]: voc_domain::Record

#![warn(missing_docs)]

mod collector;
mod json_dir;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use voc_domain::{GameConfig, Record};

pub use collector::{Collector, CollectorConfig};
pub use json_dir::JsonDirPager;

/// Errors that can occur while collecting reviews
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source data could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// The page source reported a failure
    #[error("Source error: {0}")]
    Source(String),

    /// The page source task panicked or was cancelled
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One review as delivered by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReview {
    /// Store-assigned identifier
    #[serde(rename = "reviewId")]
    pub review_id: String,

    /// Review body; some store entries are rating-only
    #[serde(default)]
    pub content: Option<String>,

    /// Star rating 1-5
    pub score: u8,

    /// When the review was posted
    pub at: DateTime<Utc>,
}

impl RawReview {
    /// Whether the review has any text worth analyzing
    pub fn has_content(&self) -> bool {
        self.content
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }

    /// Convert into a pipeline record for `game`
    pub fn into_record(self, game: &GameConfig) -> Record {
        Record {
            date: self.at.format("%Y-%m-%d").to_string(),
            game: game.key.clone(),
            genre: game.genre.clone(),
            review_id: self.review_id,
            rating: self.score,
            review_text: self.content.unwrap_or_default(),
        }
    }
}

/// One page of reviews, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPage {
    /// Reviews on this page
    pub reviews: Vec<RawReview>,

    /// Token for the next page, `None` on the last page
    pub next: Option<String>,
}

/// A paginated review source
pub trait ReviewPager {
    /// Error type for page fetches
    type Error;

    /// Fetch one page of reviews for `app_id`, newest first.
    ///
    /// `continuation` is `None` for the first page and the previous page's
    /// `next` token afterwards.
    fn fetch_page(
        &self,
        app_id: &str,
        continuation: Option<&str>,
    ) -> Result<ReviewPage, Self::Error>;
}
