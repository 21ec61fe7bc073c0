//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use tracing::warn;
use voc_analyzer::{AnalysisRun, Analyzer, BatchStatus};
use voc_domain::traits::{LlmProvider, RecordSink};
use voc_domain::Record;
use voc_llm::GroqProvider;
use voc_store::{CsvStore, SaveReport};

/// Execute the analyze command.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let contents = fs::read_to_string(&args.input).map_err(|e| {
        CliError::InvalidInput(format!("Cannot read {}: {}", args.input.display(), e))
    })?;
    let parsed: Vec<Record> = serde_json::from_str(&contents)?;

    let total = parsed.len();
    let records = drop_blank(parsed);
    if records.len() < total {
        println!(
            "{}",
            formatter.warning(&format!(
                "Skipping {} reviews without text",
                total - records.len()
            ))
        );
    }

    if records.is_empty() {
        println!("{}", formatter.info("Input holds no records"));
        return Ok(());
    }

    let provider = GroqProvider::from_config(&config.provider)?;
    let model = provider.model().to_string();
    let analyzer = Analyzer::new(provider, config.analyzer.clone()).with_model_name(model);
    let mut store = CsvStore::new(&config.data_dir);

    let (run, saved) = analyze_and_store(&analyzer, &records, &mut store).await?;
    print_summary(formatter, &run, &saved);
    Ok(())
}

/// Reviews with text; the rest are logged and left out
fn drop_blank(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| match record.validate() {
            Ok(()) => true,
            Err(reason) => {
                warn!("Skipping input record: {}", reason);
                false
            }
        })
        .collect()
}

/// Analyze `records` and hand each batch to `sink` as soon as it finishes.
///
/// Records the sink does not write (already stored) count as skipped. A sink
/// failure stops further writes and is returned after the run, so batches
/// already written stay persisted.
pub async fn analyze_and_store<L, S>(
    analyzer: &Analyzer<L>,
    records: &[Record],
    sink: &mut S,
) -> Result<(AnalysisRun, SaveReport)>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    S: RecordSink,
    S::Error: std::fmt::Display,
    CliError: From<S::Error>,
{
    let mut saved = SaveReport::default();
    let mut sink_error: Option<S::Error> = None;

    let run = analyzer
        .analyze_with(records, |outcome, batch| {
            if sink_error.is_some() {
                return;
            }
            match sink.persist(batch) {
                Ok(written) => {
                    saved.written += written;
                    saved.skipped += batch.len().saturating_sub(written);
                }
                Err(e) => {
                    warn!("Saving batch {} failed: {}", outcome.index + 1, e);
                    sink_error = Some(e);
                }
            }
        })
        .await?;

    if let Some(e) = sink_error {
        return Err(e.into());
    }
    Ok((run, saved))
}

pub(crate) fn print_summary(formatter: &Formatter, run: &AnalysisRun, saved: &SaveReport) {
    println!("{}", formatter.run_summary(&run.stats, saved));

    for outcome in run.failed_batches() {
        if let BatchStatus::Failed { stage, error } = &outcome.status {
            println!(
                "{}",
                formatter.error(&format!(
                    "Batch {} (records {}-{}) failed at {}: {}",
                    outcome.index + 1,
                    outcome.offset + 1,
                    outcome.offset + outcome.size,
                    stage,
                    error
                ))
            );
        }
    }

    let pending = run.needs_reanalysis().count();
    if pending > 0 {
        println!(
            "{}",
            formatter.warning(&format!("{} reviews need reanalysis (priority 0)", pending))
        );
    } else {
        println!("{}", formatter.success("Analysis complete"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use voc_analyzer::AnalyzerConfig;
    use voc_domain::EnrichedRecord;
    use voc_llm::MockProvider;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record {
                date: "2025-03-01".to_string(),
                game: "lineage_m".to_string(),
                genre: "MMORPG".to_string(),
                review_id: format!("r{}", i),
                rating: 3,
                review_text: format!("review {}", i),
            })
            .collect()
    }

    fn analyzer(provider: MockProvider) -> Analyzer<MockProvider> {
        Analyzer::new(
            provider,
            AnalyzerConfig {
                batch_size: 2,
                requests_per_minute: 6000,
                ..AnalyzerConfig::default()
            },
        )
    }

    /// Accepts one batch, then fails
    #[derive(Default)]
    struct FlakySink {
        batches: usize,
    }

    impl RecordSink for FlakySink {
        type Error = std::io::Error;

        fn persist(
            &mut self,
            records: &[EnrichedRecord],
        ) -> std::result::Result<usize, Self::Error> {
            self.batches += 1;
            if self.batches > 1 {
                return Err(std::io::Error::other("disk full"));
            }
            Ok(records.len())
        }
    }

    #[tokio::test]
    async fn test_every_batch_is_saved() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvStore::new(dir.path());
        let provider = MockProvider::default();
        provider.push_reply(r#"[{"priority":4},{"priority":2}]"#);
        provider.push_error("upstream 500");

        let (run, saved) = analyze_and_store(&analyzer(provider), &records(3), &mut store)
            .await
            .unwrap();

        assert_eq!(run.stats.failed, 1);
        assert_eq!(run.failed_batches().count(), 1);
        assert_eq!(saved, SaveReport { written: 3, skipped: 0 });
        let stored: Vec<u8> = store
            .load_all()
            .unwrap()
            .iter()
            .map(|r| r.analysis.priority)
            .collect();
        assert_eq!(stored, vec![4, 2, 0]);
    }

    #[tokio::test]
    async fn test_rerun_skips_stored_reviews() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvStore::new(dir.path());
        let input = records(2);

        analyze_and_store(&analyzer(MockProvider::default()), &input, &mut store)
            .await
            .unwrap();
        let (_, saved) = analyze_and_store(&analyzer(MockProvider::default()), &input, &mut store)
            .await
            .unwrap();

        assert_eq!(saved, SaveReport { written: 0, skipped: 2 });
    }

    #[tokio::test]
    async fn test_sink_failure_keeps_earlier_batches() {
        let provider = MockProvider::default();
        let mut sink = FlakySink::default();

        let result = analyze_and_store(&analyzer(provider.clone()), &records(5), &mut sink).await;

        assert!(matches!(result, Err(CliError::Io(_))));
        assert_eq!(sink.batches, 2, "no writes after the failure");
        assert_eq!(provider.call_count(), 3, "the run still finishes");
    }

    #[tokio::test]
    async fn test_blank_review_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvStore::new(dir.path());
        let mut input = records(25);
        input[24].review_text = String::new();

        let input = drop_blank(input);
        let analyzer = analyzer(MockProvider::default());
        let (run, saved) = analyze_and_store(&analyzer, &input, &mut store)
            .await
            .unwrap();

        assert_eq!(run.records.len(), 24);
        assert_eq!(saved.written, 24);
        assert!(!store.existing_ids().unwrap().contains("r24"));
    }

    #[test]
    fn test_drop_blank_keeps_order() {
        let mut input = records(4);
        input[1].review_text = "   ".to_string();

        let ids: Vec<String> = drop_blank(input).into_iter().map(|r| r.review_id).collect();
        assert_eq!(ids, vec!["r0", "r2", "r3"]);
    }
}
