//! Report command implementation.

use crate::cli::ReportArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use chrono::{Duration, Local, NaiveDate};
use std::time::Duration as StdDuration;
use voc_llm::GroqProvider;
use voc_reporter::{BriefingOutcome, CommentGenerator, Reporter, TelegramNotifier};
use voc_store::CsvStore;

/// Execute the report command.
pub async fn execute_report(
    args: ReportArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let today = Local::now().date_naive();
    let days = args.days.unwrap_or(config.days);
    let records = CsvStore::new(&config.data_dir).load_since(cutoff(today, days))?;

    let mut reporter: Reporter<GroqProvider> = Reporter::new();

    match GroqProvider::from_config(&config.provider) {
        Ok(provider) => {
            reporter = reporter.with_comments(
                CommentGenerator::new(provider)
                    .with_timeout(StdDuration::from_secs(config.analyzer.request_timeout_secs)),
            );
        }
        Err(e) => println!(
            "{}",
            formatter.warning(&format!("AI comment disabled: {}", e))
        ),
    }

    if !args.dry_run {
        match TelegramNotifier::from_config(&config.telegram) {
            Ok(notifier) => reporter = reporter.with_notifier(notifier),
            Err(e) => println!(
                "{}",
                formatter.warning(&format!("Not sending to Telegram: {}", e))
            ),
        }
    }

    match reporter.send_briefing(&records, &config.games, today).await? {
        BriefingOutcome::NoData => {
            println!(
                "{}",
                formatter.info(&format!("No analyzed reviews in the last {} days", days))
            );
        }
        BriefingOutcome::Built(message) => println!("{}", message),
        BriefingOutcome::Sent(_) => println!("{}", formatter.success("Briefing sent")),
    }

    Ok(())
}

/// First date inside a window of `days` days ending `today`
fn cutoff(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(i64::from(days))
}
