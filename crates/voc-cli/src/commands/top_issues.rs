//! Top-issues command implementation.

use crate::cli::TopIssuesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::PathBuf;
use voc_reporter::top_issues;
use voc_store::{write_csv, CsvStore};

/// Default file name inside the data directory
const TOP_ISSUES_FILE: &str = "top_issues.csv";

/// Execute the top-issues command.
pub async fn execute_top_issues(
    args: TopIssuesArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let records = CsvStore::new(&config.data_dir).load_all()?;
    let issues = top_issues(&records);

    let output = args.output.unwrap_or_else(|| default_output(config));
    write_csv(&output, &issues)?;

    println!("{}", formatter.top_issues(&issues));
    println!(
        "{}",
        formatter.success(&format!(
            "{} issues written to {}",
            issues.len(),
            output.display()
        ))
    );
    Ok(())
}

/// Where `top-issues` writes when no `--output` is given
pub fn default_output(config: &Config) -> PathBuf {
    config.data_dir.join(TOP_ISSUES_FILE)
}
