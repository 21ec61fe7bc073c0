//! Core Analyzer implementation

use crate::batching::{partition, Batch};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::merger::{MergeOutput, RecordMerger};
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use crate::rate_limit::RateLimiter;
use crate::types::{AnalysisRun, BatchOutcome, BatchStage, BatchStatus, RunStats};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use voc_domain::traits::LlmProvider;
use voc_domain::{EnrichedRecord, Record};

/// Provider call running on the blocking pool
type ProviderCall = JoinHandle<Result<String, AnalyzerError>>;

/// The Analyzer enriches review records with LLM analysis, one batch at a time
pub struct Analyzer<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: AnalyzerConfig,
    model_name: String,
}

impl<L> Analyzer<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new Analyzer
    pub fn new(llm_provider: L, config: AnalyzerConfig) -> Self {
        Self {
            llm_provider: Arc::new(llm_provider),
            config,
            model_name: "llm".to_string(),
        }
    }

    /// Create a new Analyzer with a specific model name
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Analyze every record.
    ///
    /// The output always holds exactly one enriched record per input record,
    /// in input order. A failing batch never fails the run; its records get
    /// the fallback result instead.
    ///
    /// # Errors
    /// `Config` for an invalid configuration, raised before any request is
    /// sent.
    pub async fn analyze(&self, records: &[Record]) -> Result<AnalysisRun, AnalyzerError> {
        self.analyze_with(records, |_, _| {}).await
    }

    /// Analyze every record, handing each batch's output to `on_batch` as soon
    /// as that batch completes.
    ///
    /// Callers that persist inside `on_batch` keep every finished batch even
    /// if the run is interrupted later.
    pub async fn analyze_with<F>(
        &self,
        records: &[Record],
        mut on_batch: F,
    ) -> Result<AnalysisRun, AnalyzerError>
    where
        F: FnMut(&BatchOutcome, &[EnrichedRecord]),
    {
        self.config.validate().map_err(AnalyzerError::Config)?;

        let start_time = Instant::now();
        let batches = partition(records, self.config.batch_size);
        let total_batches = batches.len();

        info!(
            "Analyzing {} records in {} batches of up to {} with model '{}'",
            records.len(),
            total_batches,
            self.config.batch_size,
            self.model_name
        );

        let mut limiter = RateLimiter::per_minute(self.config.requests_per_minute);
        let mut in_flight: Option<ProviderCall> = None;
        debug!("Request interval: {:?}", limiter.interval());
        let mut output = Vec::with_capacity(records.len());
        let mut outcomes = Vec::with_capacity(total_batches);
        let mut stats = RunStats {
            total_records: records.len(),
            batches: total_batches,
            ..RunStats::default()
        };

        for batch in &batches {
            if batch.index > 0 {
                finish_in_flight(&mut in_flight).await;
                limiter.wait().await;
            }

            info!(
                "Batch {}/{} analyzing ({} records)",
                batch.index + 1,
                total_batches,
                batch.len()
            );

            let (enriched, outcome) = self
                .process_batch(batch, &mut limiter, &mut in_flight)
                .await;

            match &outcome.status {
                BatchStatus::Done => {
                    stats.succeeded += 1;
                    info!("Batch {}/{} done", batch.index + 1, total_batches);
                }
                BatchStatus::Failed { stage, error } => {
                    stats.failed += 1;
                    stats.fallback_records += enriched.len();
                    warn!(
                        "Batch {}/{} failed at {}: {}",
                        batch.index + 1,
                        total_batches,
                        stage,
                        error
                    );
                }
            }
            stats.coercion_warnings += outcome.coercion_warnings;

            on_batch(&outcome, &enriched);
            output.extend(enriched);
            outcomes.push(outcome);
        }

        finish_in_flight(&mut in_flight).await;

        stats.elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!("Analysis complete: {}", stats.summary());

        Ok(AnalysisRun {
            records: output,
            batches: outcomes,
            stats,
        })
    }

    /// Run one batch through every stage, substituting the fallback on failure
    async fn process_batch(
        &self,
        batch: &Batch<'_>,
        limiter: &mut RateLimiter,
        in_flight: &mut Option<ProviderCall>,
    ) -> (Vec<EnrichedRecord>, BatchOutcome) {
        let mut outcome = BatchOutcome {
            index: batch.index,
            offset: batch.offset,
            size: batch.len(),
            status: BatchStatus::Done,
            coercion_warnings: 0,
        };

        match self.run_stages(batch, limiter, in_flight).await {
            Ok(merged) => {
                if merged.coercion_warnings > 0 {
                    debug!(
                        "Batch {} needed {} field coercions",
                        batch.index + 1,
                        merged.coercion_warnings
                    );
                }
                outcome.coercion_warnings = merged.coercion_warnings;
                (merged.records, outcome)
            }
            Err((stage, error)) => {
                let fallback = batch
                    .records
                    .iter()
                    .cloned()
                    .map(EnrichedRecord::fallback)
                    .collect();
                outcome.status = BatchStatus::Failed { stage, error };
                (fallback, outcome)
            }
        }
    }

    async fn run_stages(
        &self,
        batch: &Batch<'_>,
        limiter: &mut RateLimiter,
        in_flight: &mut Option<ProviderCall>,
    ) -> Result<MergeOutput, (BatchStage, AnalyzerError)> {
        let prompt = PromptBuilder::new(batch.records, &self.config.taxonomy)
            .build()
            .map_err(|e| (BatchStage::Building, e))?;

        debug!("Prompt length: {} chars", prompt.len());

        limiter.mark_dispatch();
        let reply = self
            .call_llm(prompt, in_flight)
            .await
            .map_err(|e| (BatchStage::Dispatching, e))?;

        debug!("LLM response length: {} chars", reply.len());

        let results = parse_response(&reply).map_err(|e| (BatchStage::Parsing, e))?;

        RecordMerger::new(&self.config.taxonomy)
            .merge(batch.records, results)
            .map_err(|e| (BatchStage::Merging, e))
    }

    /// Call the LLM provider, bounded by the request timeout.
    ///
    /// The blocking call cannot be cancelled. On timeout its handle is left in
    /// `in_flight` and must be awaited before the next dispatch.
    async fn call_llm(
        &self,
        prompt: String,
        in_flight: &mut Option<ProviderCall>,
    ) -> Result<String, AnalyzerError> {
        let llm = Arc::clone(&self.llm_provider);

        // Call in a blocking context since LlmProvider is not async
        let mut task = tokio::task::spawn_blocking(move || {
            llm.generate(&prompt)
                .map_err(|e| AnalyzerError::Provider(e.to_string()))
        });

        match timeout(self.config.request_timeout(), &mut task).await {
            Ok(joined) => {
                joined.map_err(|e| AnalyzerError::Internal(format!("Task join error: {}", e)))?
            }
            Err(_) => {
                *in_flight = Some(task);
                Err(AnalyzerError::Provider(format!(
                    "timed out after {}s",
                    self.config.request_timeout_secs
                )))
            }
        }
    }
}

/// Wait for a timed-out provider call so requests never overlap
async fn finish_in_flight(in_flight: &mut Option<ProviderCall>) {
    if let Some(task) = in_flight.take() {
        info!("Waiting for a timed-out provider call to finish");
        match task.await {
            Ok(Ok(_)) => debug!("Late reply discarded"),
            Ok(Err(e)) => debug!("Timed-out call ended with: {}", e),
            Err(e) => debug!("Timed-out call did not complete: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voc_llm::MockProvider;

    fn config() -> AnalyzerConfig {
        AnalyzerConfig {
            batch_size: 2,
            requests_per_minute: 6000,
            ..AnalyzerConfig::default()
        }
    }

    fn record(id: &str, text: &str) -> Record {
        Record {
            date: "2025-03-01".to_string(),
            game: "g".to_string(),
            genre: "RPG".to_string(),
            review_id: id.to_string(),
            rating: 2,
            review_text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_input_sends_nothing() {
        let provider = MockProvider::default();
        let analyzer = Analyzer::new(provider.clone(), config());

        let run = analyzer.analyze(&[]).await.unwrap();
        assert!(run.records.is_empty());
        assert!(run.batches.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_dispatch() {
        let provider = MockProvider::default();
        let analyzer = Analyzer::new(
            provider.clone(),
            AnalyzerConfig {
                batch_size: 0,
                ..AnalyzerConfig::default()
            },
        );

        let result = analyzer.analyze(&[record("a", "text")]).await;
        assert!(matches!(result, Err(AnalyzerError::Config(_))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_review_is_analyzed_with_its_batch() {
        let provider = MockProvider::default();
        provider.push_reply(r#"[{"priority":4},{"priority":1}]"#);
        let analyzer = Analyzer::new(provider.clone(), config());

        let records = vec![record("a", "fine"), record("b", "   ")];
        let run = analyzer.analyze(&records).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert!(run.batches[0].is_done());
        assert_eq!(run.records[1].record, records[1]);
        assert_eq!(run.records[1].analysis.priority, 1);
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let provider = MockProvider::default();
        provider.push_error("service unavailable");
        let analyzer = Analyzer::new(provider, config());

        let run = analyzer
            .analyze(&[record("a", "x"), record("b", "y")])
            .await
            .unwrap();
        assert_eq!(run.records.len(), 2);
        assert!(run.records.iter().all(|r| r.needs_reanalysis()));
        assert!(matches!(
            &run.batches[0].status,
            BatchStatus::Failed {
                stage: BatchStage::Dispatching,
                error: AnalyzerError::Provider(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_model_name() {
        let analyzer =
            Analyzer::new(MockProvider::default(), config()).with_model_name("test-model");
        assert_eq!(analyzer.model_name, "test-model");
        assert_eq!(analyzer.config.batch_size, 2);
    }
}
