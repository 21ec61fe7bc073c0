//! Run command implementation.

use crate::cli::RunArgs;
use crate::commands::analyze::{analyze_and_store, print_summary};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::PathBuf;
use tracing::info;
use voc_analyzer::Analyzer;
use voc_collector::{Collector, JsonDirPager};
use voc_domain::{GameConfig, Record};
use voc_llm::GroqProvider;
use voc_store::CsvStore;

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let games = select_games(config, args.game.as_deref())?;
    let source = source_dir(config, args.source)?;
    let days = args.days.unwrap_or(config.days);

    let pager = JsonDirPager::new(source);
    info!("Reading review dumps from {}", pager.dir().display());
    let collector = Collector::new(pager, config.collector.clone());
    let collected = collector.fetch_all(&games, days).await;

    let mut store = CsvStore::new(&config.data_dir);
    let records = drop_stored(collected, &store)?;
    if records.is_empty() {
        println!("{}", formatter.info("No new reviews to analyze"));
        return Ok(());
    }

    let provider = GroqProvider::from_config(&config.provider)?;
    let model = provider.model().to_string();
    let analyzer = Analyzer::new(provider, config.analyzer.clone()).with_model_name(model);

    let (run, saved) = analyze_and_store(&analyzer, &records, &mut store).await?;
    print_summary(formatter, &run, &saved);
    Ok(())
}

fn select_games(config: &Config, key: Option<&str>) -> Result<Vec<GameConfig>> {
    let games = match key {
        Some(key) => vec![config.game(key)?.clone()],
        None => config.games.clone(),
    };
    if games.is_empty() {
        return Err(CliError::Config("No games configured".to_string()));
    }
    Ok(games)
}

fn source_dir(config: &Config, arg: Option<PathBuf>) -> Result<PathBuf> {
    arg.or_else(|| config.source_dir.clone()).ok_or_else(|| {
        CliError::InvalidInput(
            "No review source: pass --source or set source_dir in the config".to_string(),
        )
    })
}

/// Skip reviews analyzed in an earlier run
fn drop_stored(records: Vec<Record>, store: &CsvStore) -> Result<Vec<Record>> {
    let existing = store.existing_ids()?;
    let total = records.len();
    let fresh: Vec<Record> = records
        .into_iter()
        .filter(|r| !existing.contains(&r.review_id))
        .collect();
    if fresh.len() < total {
        info!("{} reviews already stored, skipping", total - fresh.len());
    }
    Ok(fresh)
}
