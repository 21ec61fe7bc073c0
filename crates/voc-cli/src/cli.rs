//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Voc - Game review VOC collection, analysis and briefing.
#[derive(Debug, Parser)]
#[command(name = "voc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.voc/config.toml)
    #[arg(short, long, global = true, env = "VOC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect recent reviews, analyze them and store the results
    Run(RunArgs),

    /// Analyze records from a JSON file and store the results
    Analyze(AnalyzeArgs),

    /// Build the daily briefing and send it to Telegram
    Report(ReportArgs),

    /// Write the top issue per game and category
    TopIssues(TopIssuesArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Only this game (key from the configuration)
    #[arg(short, long)]
    pub game: Option<String>,

    /// Collect reviews from the last N days
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Directory of `<app_id>.json` review dumps
    #[arg(short, long)]
    pub source: Option<PathBuf>,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// JSON file holding an array of records
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the report command.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Include reviews from the last N days
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Print the briefing instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the top-issues command.
#[derive(Debug, Parser)]
pub struct TopIssuesArgs {
    /// Output CSV path (default: <data_dir>/top_issues.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["voc", "run", "--game", "lineage_m", "--days", "7"]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.game.as_deref(), Some("lineage_m"));
                assert_eq!(args.days, Some(7));
                assert!(args.source.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_analyze_requires_input() {
        assert!(Cli::try_parse_from(["voc", "analyze"]).is_err());
        let cli = Cli::parse_from(["voc", "analyze", "--input", "records.json"]);
        assert!(matches!(cli.command, Command::Analyze(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["voc", "report", "--dry-run", "--no-color", "-c", "voc.toml"]);
        assert!(cli.no_color);
        assert_eq!(cli.config, Some(PathBuf::from("voc.toml")));
        match cli.command {
            Command::Report(args) => assert!(args.dry_run),
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_top_issues_command_name() {
        let cli = Cli::parse_from(["voc", "top-issues", "-o", "out.csv"]);
        match cli.command {
            Command::TopIssues(args) => assert_eq!(args.output, Some(PathBuf::from("out.csv"))),
            _ => panic!("Expected TopIssues command"),
        }
    }
}
