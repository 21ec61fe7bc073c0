//! Prompt construction for batch review analysis

use crate::error::AnalyzerError;
use serde::Serialize;
use voc_domain::{Record, Taxonomy};

/// One review as it appears in the prompt
#[derive(Debug, Serialize)]
struct PromptItem<'a> {
    index: usize,
    rating: u8,
    text: &'a str,
}

/// Builds the provider request for one batch
pub struct PromptBuilder<'a> {
    records: &'a [Record],
    taxonomy: &'a Taxonomy,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(records: &'a [Record], taxonomy: &'a Taxonomy) -> Self {
        Self { records, taxonomy }
    }

    /// Build the complete analysis prompt
    ///
    /// Records are listed in batch order with their 0-based position as
    /// `index`, so reply items can be paired back positionally.
    pub fn build(&self) -> Result<String, AnalyzerError> {
        let items: Vec<PromptItem<'_>> = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| PromptItem {
                index,
                rating: record.rating,
                text: &record.review_text,
            })
            .collect();

        let reviews_json = serde_json::to_string_pretty(&items)
            .map_err(|e| AnalyzerError::Internal(format!("prompt serialization failed: {}", e)))?;

        let mut prompt = String::new();

        // 1. Output keys and closed value sets
        prompt.push_str("아래 게임 리뷰들을 분석하여 JSON 배열로 반환하라.\n");
        prompt.push_str("각 항목은 반드시 다음 키를 포함해야 한다:\n");
        prompt.push_str(&format!(
            "- category: {} 중 하나\n",
            self.taxonomy.categories.join("、")
        ));
        prompt.push_str(&format!(
            "- sentiment: {} 중 하나\n",
            self.taxonomy.sentiments.join("、")
        ));
        prompt.push_str(FIELD_INSTRUCTIONS);
        prompt.push('\n');

        // 2. Translation
        prompt.push_str(TRANSLATE_INSTRUCTION);
        prompt.push_str("\n\n");

        // 3. The batch
        prompt.push_str("리뷰 목록 (index 순서대로 결과를 반환):\n");
        prompt.push_str(&reviews_json);
        prompt.push_str("\n\n");

        // 4. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt.push('\n');
        prompt.push_str(&format!(
            "배열 길이는 입력 리뷰 수({}개)와 동일해야 한다.\n",
            self.records.len()
        ));

        Ok(prompt)
    }
}

const FIELD_INSTRUCTIONS: &str = "- summary: 리뷰 핵심을 1~2문장으로 요약
- keywords: 핵심 키워드 3개 이내, 쉼표로 구분한 문자열
- priority: 긴급도 1~5 정수 (5가 가장 긴급)";

const TRANSLATE_INSTRUCTION: &str = "한국어가 아닌 리뷰는 한국어로 번역 후 분석하라.";

const OUTPUT_FORMAT_REMINDER: &str =
    "반드시 JSON 배열만 출력하고, 마크다운 코드 블록이나 다른 텍스트를 포함하지 마라.";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn record(id: &str, rating: u8, text: &str) -> Record {
        Record {
            date: "2025-03-01".to_string(),
            game: "lineage_m".to_string(),
            genre: "MMORPG".to_string(),
            review_id: id.to_string(),
            rating,
            review_text: text.to_string(),
        }
    }

    fn embedded_items(prompt: &str) -> Vec<Value> {
        let start = prompt.find("\n[").expect("items array") + 1;
        let end = prompt[start..].find("\n]").expect("array end") + start + 2;
        serde_json::from_str::<Vec<Value>>(&prompt[start..end]).expect("valid json")
    }

    #[test]
    fn test_prompt_lists_taxonomy() {
        let records = vec![record("a", 1, "crashes on login")];
        let taxonomy = Taxonomy::default();
        let prompt = PromptBuilder::new(&records, &taxonomy).build().unwrap();

        assert!(prompt.contains("BM、밸런스、강화、서버、운영"));
        assert!(prompt.contains("부정、중립、긍정"));
        for key in ["category", "sentiment", "summary", "keywords", "priority"] {
            assert!(prompt.contains(key), "missing key {}", key);
        }
    }

    #[test]
    fn test_prompt_contains_translation_and_length_instructions() {
        let records = vec![record("a", 1, "x"), record("b", 2, "y")];
        let taxonomy = Taxonomy::default();
        let prompt = PromptBuilder::new(&records, &taxonomy).build().unwrap();

        assert!(prompt.contains("번역"));
        assert!(prompt.contains("JSON 배열"));
        assert!(prompt.contains("(2개)"));
    }

    #[test]
    fn test_prompt_preserves_order_and_indexes() {
        let records = vec![
            record("a", 1, "first"),
            record("b", 5, "두 번째"),
            record("c", 3, "third"),
        ];
        let taxonomy = Taxonomy::default();
        let prompt = PromptBuilder::new(&records, &taxonomy).build().unwrap();

        let items = embedded_items(&prompt);
        assert_eq!(items.len(), 3);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item["index"], i);
            assert_eq!(item["text"], records[i].review_text.as_str());
            assert_eq!(item["rating"], records[i].rating);
        }
    }

    #[test]
    fn test_prompt_keeps_non_ascii_text() {
        let records = vec![record("a", 2, "강화 확률이 너무 낮아요")];
        let taxonomy = Taxonomy::default();
        let prompt = PromptBuilder::new(&records, &taxonomy).build().unwrap();
        assert!(prompt.contains("강화 확률이 너무 낮아요"));
    }

    #[test]
    fn test_prompt_uses_custom_taxonomy() {
        let records = vec![record("a", 4, "fine")];
        let taxonomy = Taxonomy::new(
            vec!["UI".to_string(), "Sound".to_string()],
            vec!["bad".to_string(), "good".to_string()],
        )
        .unwrap();
        let prompt = PromptBuilder::new(&records, &taxonomy).build().unwrap();
        assert!(prompt.contains("UI、Sound 중 하나"));
        assert!(prompt.contains("bad、good 중 하나"));
        assert!(!prompt.contains("밸런스"));
    }

    #[test]
    fn test_instructions_do_not_repeat_index_key() {
        let records = vec![record("a", 1, "x")];
        let taxonomy = Taxonomy::default();
        let prompt = PromptBuilder::new(&records, &taxonomy).build().unwrap();
        assert_eq!(prompt.matches("\"index\":").count(), 1);
    }
}
