//! Voc CLI - collect, analyze and brief on game store reviews.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use voc_cli::commands;
use voc_cli::{Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> voc_cli::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let color_enabled = !cli.no_color && config.color;
    let formatter = Formatter::new(color_enabled);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await?,
        Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter).await?,
        Command::Report(args) => commands::execute_report(args, &config, &formatter).await?,
        Command::TopIssues(args) => {
            commands::execute_top_issues(args, &config, &formatter).await?
        }
    }

    Ok(())
}
