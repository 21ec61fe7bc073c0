//! Paginated collection with a date cutoff

use crate::{CollectorError, ReviewPage, ReviewPager};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use voc_domain::{GameConfig, Record};

/// Collection pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Pause between two pages of the same game (milliseconds)
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause between two games (milliseconds)
    #[serde(default = "default_game_delay_ms")]
    pub game_delay_ms: u64,
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_game_delay_ms() -> u64 {
    2000
}

impl CollectorConfig {
    /// Pause between pages as a Duration
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Pause between games as a Duration
    pub fn game_delay(&self) -> Duration {
        Duration::from_millis(self.game_delay_ms)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay_ms(),
            game_delay_ms: default_game_delay_ms(),
        }
    }
}

/// Collects recent reviews for configured games
pub struct Collector<P>
where
    P: ReviewPager,
{
    pager: Arc<P>,
    config: CollectorConfig,
}

impl<P> Collector<P>
where
    P: ReviewPager + Send + Sync + 'static,
    P::Error: std::fmt::Display,
{
    /// Create a new Collector
    pub fn new(pager: P, config: CollectorConfig) -> Self {
        Self {
            pager: Arc::new(pager),
            config,
        }
    }

    /// Reviews for `game` posted within the last `days` days, newest first
    pub async fn fetch_reviews(
        &self,
        game: &GameConfig,
        days: u32,
    ) -> Result<Vec<Record>, CollectorError> {
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(days));
        self.fetch_reviews_since(game, cutoff).await
    }

    /// Reviews for `game` posted at or after `cutoff`, newest first.
    ///
    /// Reviews without text are skipped. Paging stops at the first review
    /// older than the cutoff or when the source has no further pages.
    pub async fn fetch_reviews_since(
        &self,
        game: &GameConfig,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Record>, CollectorError> {
        let mut records = Vec::new();
        let mut continuation: Option<String> = None;
        let mut page_number = 0;

        loop {
            page_number += 1;
            let page = self.fetch_page(&game.app_id, continuation.take()).await?;
            debug!(
                "{} page {}: {} reviews",
                game.key,
                page_number,
                page.reviews.len()
            );

            if page.reviews.is_empty() {
                break;
            }

            let mut reached_cutoff = false;
            for review in page.reviews {
                if !review.has_content() {
                    continue;
                }
                if review.at < cutoff {
                    reached_cutoff = true;
                    break;
                }
                records.push(review.into_record(game));
            }

            match page.next {
                Some(next) if !reached_cutoff => continuation = Some(next),
                _ => break,
            }

            tokio::time::sleep(self.config.page_delay()).await;
        }

        Ok(records)
    }

    /// Collect every game in order.
    ///
    /// A game that fails is logged and skipped; the others still contribute.
    pub async fn fetch_all(&self, games: &[GameConfig], days: u32) -> Vec<Record> {
        let mut all_records = Vec::new();

        for (idx, game) in games.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.config.game_delay()).await;
            }

            info!("Collecting {} (last {} days)", game.display_name(), days);
            match self.fetch_reviews(game, days).await {
                Ok(records) => {
                    info!("Collected {} reviews for {}", records.len(), game.key);
                    all_records.extend(records);
                }
                Err(e) => warn!("Collection failed for {}: {}", game.key, e),
            }
        }

        all_records
    }

    async fn fetch_page(
        &self,
        app_id: &str,
        continuation: Option<String>,
    ) -> Result<ReviewPage, CollectorError> {
        let pager = Arc::clone(&self.pager);
        let app_id = app_id.to_string();

        // Page sources do blocking IO
        tokio::task::spawn_blocking(move || {
            pager
                .fetch_page(&app_id, continuation.as_deref())
                .map_err(|e| CollectorError::Source(e.to_string()))
        })
        .await
        .map_err(|e| CollectorError::Internal(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawReview;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves fixed pages per app and records every request
    #[derive(Default)]
    struct ScriptedPager {
        pages: HashMap<String, Vec<ReviewPage>>,
        requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ReviewPager for ScriptedPager {
        type Error = String;

        fn fetch_page(
            &self,
            app_id: &str,
            continuation: Option<&str>,
        ) -> Result<ReviewPage, Self::Error> {
            self.requests
                .lock()
                .unwrap()
                .push((app_id.to_string(), continuation.map(str::to_string)));

            let pages = self
                .pages
                .get(app_id)
                .ok_or_else(|| format!("unknown app {}", app_id))?;
            let idx = continuation.map(|c| c.parse::<usize>().unwrap()).unwrap_or(0);
            Ok(pages[idx].clone())
        }
    }

    fn no_delay() -> CollectorConfig {
        CollectorConfig {
            page_delay_ms: 0,
            game_delay_ms: 0,
        }
    }

    fn game(key: &str, app_id: &str) -> GameConfig {
        GameConfig {
            key: key.to_string(),
            app_id: app_id.to_string(),
            genre: "RPG".to_string(),
            label: None,
        }
    }

    fn review(id: &str, content: Option<&str>, days_ago: i64) -> RawReview {
        RawReview {
            review_id: id.to_string(),
            content: content.map(str::to_string),
            score: 3,
            at: Utc::now() - ChronoDuration::days(days_ago),
        }
    }

    fn page(reviews: Vec<RawReview>, next: Option<&str>) -> ReviewPage {
        ReviewPage {
            reviews,
            next: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_follows_continuation_tokens() {
        let mut pager = ScriptedPager::default();
        pager.pages.insert(
            "app.a".to_string(),
            vec![
                page(vec![review("1", Some("a"), 0), review("2", Some("b"), 1)], Some("1")),
                page(vec![review("3", Some("c"), 2)], None),
            ],
        );
        let collector = Collector::new(pager, no_delay());

        let records = collector.fetch_reviews(&game("a", "app.a"), 30).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_stops_at_cutoff() {
        let mut pager = ScriptedPager::default();
        pager.pages.insert(
            "app.a".to_string(),
            vec![
                page(
                    vec![
                        review("1", Some("new"), 1),
                        review("2", Some("old"), 10),
                        review("3", Some("older"), 1),
                    ],
                    Some("1"),
                ),
                page(vec![review("4", Some("never fetched"), 0)], None),
            ],
        );
        let collector = Collector::new(pager, no_delay());

        let records = collector.fetch_reviews(&game("a", "app.a"), 7).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].review_id, "1");
        assert_eq!(collector.pager.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_skips_reviews_without_text() {
        let mut pager = ScriptedPager::default();
        pager.pages.insert(
            "app.a".to_string(),
            vec![page(
                vec![
                    review("1", None, 0),
                    review("2", Some(""), 0),
                    review("3", Some("text"), 0),
                ],
                None,
            )],
        );
        let collector = Collector::new(pager, no_delay());

        let records = collector.fetch_reviews(&game("a", "app.a"), 30).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].review_id, "3");
    }

    #[tokio::test]
    async fn test_empty_page_ends_collection() {
        let mut pager = ScriptedPager::default();
        pager
            .pages
            .insert("app.a".to_string(), vec![page(vec![], Some("1"))]);
        let collector = Collector::new(pager, no_delay());

        let records = collector.fetch_reviews(&game("a", "app.a"), 30).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_source_error() {
        let collector = Collector::new(ScriptedPager::default(), no_delay());
        let result = collector.fetch_reviews(&game("a", "missing"), 30).await;
        assert!(matches!(result, Err(CollectorError::Source(msg)) if msg.contains("missing")));
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failing_game() {
        let mut pager = ScriptedPager::default();
        pager.pages.insert(
            "app.a".to_string(),
            vec![page(vec![review("a1", Some("x"), 0)], None)],
        );
        pager.pages.insert(
            "app.c".to_string(),
            vec![page(vec![review("c1", Some("y"), 0)], None)],
        );
        let collector = Collector::new(pager, no_delay());

        let games = vec![
            game("a", "app.a"),
            game("b", "app.broken"),
            game("c", "app.c"),
        ];
        let records = collector.fetch_all(&games, 30).await;

        let keys: Vec<_> = records.iter().map(|r| r.game.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_config_defaults() {
        let config: CollectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CollectorConfig::default());
        assert_eq!(config.page_delay(), Duration::from_secs(1));
        assert_eq!(config.game_delay(), Duration::from_secs(2));
    }
}
