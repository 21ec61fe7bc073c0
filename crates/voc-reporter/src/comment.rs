//! LLM-written briefing comment

use crate::briefing::issue_line;
use crate::risk::GameStats;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use voc_analyzer::decode_reply;
use voc_domain::traits::LlmProvider;
use voc_domain::EnrichedRecord;

/// Issue text length in the comment prompt
const PROMPT_ISSUE_CHARS: usize = 60;

/// Situation summary and recommended actions for the briefing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiComment {
    /// Two or three sentence overview
    pub comment: String,

    /// Recommended follow-up actions
    pub actions: Vec<String>,
}

impl AiComment {
    /// Comment standing in for a failed generation
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            comment: format!("AI 코멘트 생성 실패: {}", reason),
            actions: Vec::new(),
        }
    }

    /// Actions as a numbered list, one per line
    pub fn actions_text(&self) -> String {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, action)| format!("{}. {}", i + 1, action))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn from_reply(value: &Value) -> Self {
        let comment = match value.get("comment") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        let actions = match value.get("actions") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        };
        Self { comment, actions }
    }
}

/// Asks the provider for a comment on the current VOC situation
pub struct CommentGenerator<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    request_timeout: Duration,
}

impl<L> CommentGenerator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new CommentGenerator
    pub fn new(llm_provider: L) -> Self {
        Self {
            llm_provider: Arc::new(llm_provider),
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Bound the provider call
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Generate the comment.
    ///
    /// Never fails: any provider or decode error becomes a comment describing
    /// the failure.
    pub async fn generate(&self, stats: &[GameStats], urgent: &[&EnrichedRecord]) -> AiComment {
        let prompt = comment_prompt(stats, urgent);
        debug!("Comment prompt length: {} chars", prompt.len());

        let llm = Arc::clone(&self.llm_provider);
        let task = tokio::task::spawn_blocking(move || {
            llm.generate(&prompt).map_err(|e| e.to_string())
        });

        let reply = match timeout(self.request_timeout, task).await {
            Ok(Ok(Ok(reply))) => reply,
            Ok(Ok(Err(e))) => return failed(e),
            Ok(Err(e)) => return failed(format!("Task join error: {}", e)),
            Err(_) => {
                return failed(format!(
                    "timed out after {}s",
                    self.request_timeout.as_secs()
                ))
            }
        };

        match decode_reply(&reply) {
            Ok(value) => AiComment::from_reply(&value),
            Err(e) => failed(e),
        }
    }
}

fn failed(reason: impl std::fmt::Display) -> AiComment {
    warn!("Comment generation failed: {}", reason);
    AiComment::failed(reason)
}

/// Prompt asking for `{"comment", "actions"}` JSON
pub(crate) fn comment_prompt(stats: &[GameStats], urgent: &[&EnrichedRecord]) -> String {
    let stats_text = stats
        .iter()
        .map(|s| {
            format!(
                "- {}: 위험등급 {}, 평균 긴급도 {:.1}, 총 {}건",
                s.label, s.risk, s.avg_priority, s.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let issues_text = urgent
        .iter()
        .enumerate()
        .map(|(i, r)| issue_line(i, r, PROMPT_ISSUE_CHARS))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "다음은 게임 VOC 분석 결과다. 운영 PM을 위한 브리핑을 작성하라.\n\n\
         [게임별 현황]\n{}\n\n\
         [긴급도 높은 이슈]\n{}\n\n\
         아래 두 항목을 JSON으로 반환하라:\n\
         {{\n  \"comment\": \"전체 VOC 상황 요약 (2~3문장, 한국어)\",\n  \
         \"actions\": [\"권장 대응 액션 1\", \"권장 대응 액션 2\", \"권장 대응 액션 3\"]\n}}\n\n\
         JSON만 출력하라.",
        stats_text, issues_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::tests::enriched;
    use crate::risk::RiskLevel;
    use voc_llm::MockProvider;

    fn stats() -> Vec<GameStats> {
        vec![GameStats {
            key: "a".to_string(),
            label: "게임 A".to_string(),
            genre: "MMORPG".to_string(),
            risk: RiskLevel::High,
            avg_priority: 4.3,
            count: 8,
        }]
    }

    #[test]
    fn test_prompt_contents() {
        let record = enriched("a", "2025-03-01", "서버", 5);
        let prompt = comment_prompt(&stats(), &[&record]);
        assert!(prompt.contains("- 게임 A: 위험등급 HIGH, 평균 긴급도 4.3, 총 8건"));
        assert!(prompt.contains("1. [a · 서버] 서버 요약"));
        assert!(prompt.contains("\"comment\""));
        assert!(prompt.contains("\"actions\""));
    }

    #[tokio::test]
    async fn test_generate_parses_fenced_reply() {
        let provider = MockProvider::new(
            "```json\n{\"comment\": \"서버 이슈가 급증했다.\", \"actions\": [\"점검 공지\", \"보상 검토\"]}\n```",
        );
        let generator = CommentGenerator::new(provider);

        let comment = generator.generate(&stats(), &[]).await;
        assert_eq!(comment.comment, "서버 이슈가 급증했다.");
        assert_eq!(comment.actions_text(), "1. 점검 공지\n2. 보상 검토");
    }

    #[tokio::test]
    async fn test_generate_tolerates_missing_keys() {
        let generator = CommentGenerator::new(MockProvider::new("{}"));
        let comment = generator.generate(&stats(), &[]).await;
        assert_eq!(comment, AiComment::default());
    }

    #[tokio::test]
    async fn test_provider_error_becomes_comment() {
        let provider = MockProvider::default();
        provider.push_error("quota exceeded");
        let generator = CommentGenerator::new(provider);

        let comment = generator.generate(&stats(), &[]).await;
        assert!(comment.comment.starts_with("AI 코멘트 생성 실패"));
        assert!(comment.comment.contains("quota exceeded"));
        assert!(comment.actions.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_reply_becomes_comment() {
        let generator = CommentGenerator::new(MockProvider::new("Sure! Here is my analysis."));
        let comment = generator.generate(&stats(), &[]).await;
        assert!(comment.comment.starts_with("AI 코멘트 생성 실패"));
    }
}
