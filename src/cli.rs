//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// worker-impact - COVID-19 Worker Impact pages from a survey spreadsheet
///
/// Fetches crowdsourced reports from a published Google Sheets feed,
/// groups them by industry and tag, and renders one page as Markdown or JSON.
///
/// Examples:
///   worker-impact
///   worker-impact --route /retail --query "layoffs"
///   worker-impact --route /tags/food_service --format json
///   worker-impact --feed-file saved_feed.json --output page.md
///   worker-impact --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Published spreadsheet identifier
    ///
    /// Can also be set via WORKER_IMPACT_SHEET_ID or .worker-impact.toml.
    #[arg(long, value_name = "ID", env = "WORKER_IMPACT_SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Worksheet tab holding the survey responses (1-based)
    #[arg(long, value_name = "INDEX")]
    pub tab: Option<u32>,

    /// Worksheet tab holding per-industry summaries (1-based)
    #[arg(long, value_name = "INDEX")]
    pub summary_tab: Option<u32>,

    /// Worksheet tab holding the about page text (1-based)
    #[arg(long, value_name = "INDEX")]
    pub about_tab: Option<u32>,

    /// Read the responses feed from a saved JSON export instead of fetching it
    #[arg(long, value_name = "FILE")]
    pub feed_file: Option<PathBuf>,

    /// Page to render: /, /<industry>, /tags/<tag> or /about
    #[arg(short, long, default_value = "/", value_name = "PATH")]
    pub route: String,

    /// Only show responses containing this text (case-insensitive)
    #[arg(short = 'Q', long, default_value = "", value_name = "TEXT")]
    pub query: String,

    /// Output file path for the page
    #[arg(short, long, default_value = "worker_impact.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .worker-impact.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: print the feed URLs that would be fetched and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .worker-impact.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref sheet_id) = self.sheet_id {
            if sheet_id.trim().is_empty() {
                return Err("Sheet ID must not be empty".to_string());
            }
            if sheet_id.contains('/') {
                return Err("Sheet ID must not contain '/'".to_string());
            }
        }

        for (flag, tab) in [
            ("--tab", self.tab),
            ("--summary-tab", self.summary_tab),
            ("--about-tab", self.about_tab),
        ] {
            if tab == Some(0) {
                return Err(format!("{} is 1-based and must be at least 1", flag));
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref feed_file) = self.feed_file {
            if !feed_file.is_file() {
                return Err(format!("Feed file does not exist: {}", feed_file.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
