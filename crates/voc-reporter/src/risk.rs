//! Per-game risk scoring

use serde::Serialize;
use std::fmt;
use voc_domain::{EnrichedRecord, GameConfig};

/// Average priority at or above which a game is high risk
const HIGH_THRESHOLD: f64 = 3.5;

/// Average priority at or above which a game is medium risk
const MID_THRESHOLD: f64 = 2.5;

/// Risk level of a game over the reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    /// Average priority >= 3.5
    High,
    /// Average priority >= 2.5
    Mid,
    /// Everything else, including games without scored reviews
    Low,
}

impl RiskLevel {
    /// Classify an average priority
    pub fn from_average(avg: f64) -> Self {
        if avg >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if avg >= MID_THRESHOLD {
            RiskLevel::Mid
        } else {
            RiskLevel::Low
        }
    }

    /// Traffic-light marker for chat messages
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Mid => "🟡",
            RiskLevel::Low => "🟢",
        }
    }

    /// Upper-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Mid => "MID",
            RiskLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one game's scored reviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStats {
    /// Game key
    pub key: String,
    /// Display name
    pub label: String,
    /// Genre
    pub genre: String,
    /// Risk level
    pub risk: RiskLevel,
    /// Mean priority of scored reviews, 0 when there are none
    pub avg_priority: f64,
    /// Number of scored reviews
    pub count: usize,
}

fn scored<'a>(
    records: &'a [EnrichedRecord],
    game: &'a str,
) -> impl Iterator<Item = &'a EnrichedRecord> + 'a {
    records
        .iter()
        .filter(move |r| r.record.game == game && r.analysis.priority > 0)
}

fn average_priority(records: &[EnrichedRecord], game: &str) -> Option<(f64, usize)> {
    let (sum, count) = scored(records, game).fold((0u64, 0usize), |(sum, count), r| {
        (sum + u64::from(r.analysis.priority), count + 1)
    });
    (count > 0).then(|| (sum as f64 / count as f64, count))
}

/// Risk level of `game`, from the average priority of its scored reviews.
///
/// Unscored reviews (priority 0) are ignored; no scored reviews means `Low`.
pub fn calc_risk(records: &[EnrichedRecord], game: &str) -> RiskLevel {
    average_priority(records, game)
        .map(|(avg, _)| RiskLevel::from_average(avg))
        .unwrap_or(RiskLevel::Low)
}

/// Stats for every configured game, in configuration order
pub fn game_stats(records: &[EnrichedRecord], games: &[GameConfig]) -> Vec<GameStats> {
    games
        .iter()
        .map(|game| {
            let (avg_priority, count) = average_priority(records, &game.key).unwrap_or((0.0, 0));
            GameStats {
                key: game.key.clone(),
                label: game.display_name().to_string(),
                genre: game.genre.clone(),
                risk: calc_risk(records, &game.key),
                avg_priority,
                count,
            }
        })
        .collect()
}
