//! Record module - one collected review

use serde::{Deserialize, Serialize};

/// A single review as collected from the store listing.
///
/// Only `rating` and `review_text` are read by the analysis pipeline. The
/// identifying fields (`review_id`, `game`, `genre`, `date`) are carried through
/// untouched so the enriched output can be joined back to its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Review date, `YYYY-MM-DD`
    pub date: String,

    /// Game key from configuration (e.g. "lineage_m")
    pub game: String,

    /// Genre of the game
    pub genre: String,

    /// Store-assigned review identifier, used for deduplication downstream
    pub review_id: String,

    /// Star rating, normally 1-5
    pub rating: u8,

    /// Review body
    pub review_text: String,
}

impl Record {
    /// Check the fields the analysis pipeline depends on.
    ///
    /// # Errors
    /// Returns a description of the problem if `review_text` is blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.review_text.trim().is_empty() {
            return Err(format!("review '{}' has empty review_text", self.review_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            date: "2025-03-01".to_string(),
            game: "lineage_m".to_string(),
            genre: "MMORPG".to_string(),
            review_id: "gp:abc".to_string(),
            rating: 1,
            review_text: "crashes on login".to_string(),
        }
    }

    #[test]
    fn test_valid_record() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut record = sample();
        record.review_text = "   ".to_string();
        let err = record.validate().unwrap_err();
        assert!(err.contains("gp:abc"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["rating"], 1);
        assert_eq!(json["review_text"], "crashes on login");
        assert_eq!(json["review_id"], "gp:abc");
    }
}
