//! Output formatting for the CLI.

use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use voc_analyzer::RunStats;
use voc_domain::MAX_PRIORITY;
use voc_reporter::TopIssue;
use voc_store::SaveReport;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format the outcome of an analysis run.
    pub fn run_summary(&self, stats: &RunStats, saved: &SaveReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Metric".to_string(), "Value".to_string()]);
        builder.push_record(["Records".to_string(), stats.total_records.to_string()]);
        builder.push_record(["Batches".to_string(), stats.batches.to_string()]);
        builder.push_record(["Batches ok".to_string(), stats.succeeded.to_string()]);
        builder.push_record([
            "Batches failed".to_string(),
            self.highlight_nonzero(stats.failed),
        ]);
        builder.push_record([
            "Needs reanalysis".to_string(),
            self.highlight_nonzero(stats.fallback_records),
        ]);
        builder.push_record([
            "Coerced fields".to_string(),
            stats.coercion_warnings.to_string(),
        ]);
        builder.push_record(["Saved".to_string(), saved.written.to_string()]);
        builder.push_record(["Duplicates skipped".to_string(), saved.skipped.to_string()]);
        builder.push_record([
            "Elapsed".to_string(),
            format!("{:.1}s", stats.elapsed_ms as f64 / 1000.0),
        ]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format top issues as a table.
    pub fn top_issues(&self, issues: &[TopIssue]) -> String {
        if issues.is_empty() {
            return self.colorize("No issues found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Game".to_string(),
            "Category".to_string(),
            "Priority".to_string(),
            "Summary".to_string(),
            "Keywords".to_string(),
        ]);

        for issue in issues {
            let priority = if issue.priority >= MAX_PRIORITY {
                self.colorize(&issue.priority.to_string(), "red")
            } else {
                issue.priority.to_string()
            };
            builder.push_record([
                issue.game.clone(),
                issue.category.clone(),
                priority,
                issue.summary.clone(),
                issue.keywords.clone(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn highlight_nonzero(&self, value: usize) -> String {
        if value > 0 {
            self.colorize(&value.to_string(), "red")
        } else {
            value.to_string()
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(priority: u8) -> TopIssue {
        TopIssue {
            game: "lineage_m".to_string(),
            category: "서버".to_string(),
            priority,
            summary: "접속 장애".to_string(),
            keywords: "서버,점검".to_string(),
        }
    }

    #[test]
    fn test_top_issues_table() {
        let formatter = Formatter::new(false);
        let output = formatter.top_issues(&[issue(5), issue(3)]);
        assert!(output.contains("Category"));
        assert!(output.contains("접속 장애"));
        assert!(output.contains("lineage_m"));
    }

    #[test]
    fn test_empty_top_issues() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.top_issues(&[]), "No issues found.");
    }

    #[test]
    fn test_run_summary() {
        let formatter = Formatter::new(false);
        let stats = RunStats {
            total_records: 12,
            batches: 2,
            succeeded: 1,
            failed: 1,
            fallback_records: 2,
            coercion_warnings: 0,
            elapsed_ms: 2500,
        };
        let output = formatter.run_summary(&stats, &SaveReport { written: 10, skipped: 2 });
        assert!(output.contains("Needs reanalysis"));
        assert!(output.contains("2.5s"));
    }

    #[test]
    fn test_messages_without_color() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.success("done"), "✓ done");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
        assert_eq!(formatter.error("failed"), "✗ failed");
    }
}
