//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.worker-impact.toml` files.

use crate::models::ResponseType;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".worker-impact.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Spreadsheet feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Survey schema: response types, fields and sections.
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Page rendering settings.
    #[serde(default)]
    pub site: SiteConfig,
}

/// Where the survey data is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Published spreadsheet identifier.
    #[serde(default = "default_sheet_id")]
    pub sheet_id: String,

    /// Base URL of the list feed endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Worksheet tab holding the survey responses (1-based).
    #[serde(default = "default_responses_tab")]
    pub responses_tab: u32,

    /// Worksheet tab holding per-industry summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summaries_tab: Option<u32>,

    /// Worksheet tab holding the about page text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_tab: Option<u32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sheet_id: default_sheet_id(),
            base_url: default_base_url(),
            responses_tab: default_responses_tab(),
            summaries_tab: None,
            about_tab: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_sheet_id() -> String {
    "1dwwhj2zVtQdUfk9eJiFJz-BKt3-ukH3oaGJp2MBtpSg".to_string()
}

fn default_base_url() -> String {
    "https://spreadsheets.google.com/feeds/list".to_string()
}

fn default_responses_tab() -> u32 {
    2
}

fn default_timeout() -> u64 {
    30
}

/// A value per response type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerType<T> {
    pub report: T,
    pub anecdote: T,
}

impl<T> PerType<T> {
    pub fn get(&self, response_type: ResponseType) -> &T {
        match response_type {
            ResponseType::Report => &self.report,
            ResponseType::Anecdote => &self.anecdote,
        }
    }
}

/// A titled block rendered for each response of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Unprefixed field key.
    pub key: String,
    /// Heading shown above the field text.
    pub title: String,
}

impl SectionSpec {
    fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
        }
    }

    /// Field holding newline-separated citation URLs for this section.
    pub fn citation_key(&self) -> String {
        format!("{}.citation", self.key)
    }
}

/// Survey layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Column holding the response-type answer.
    #[serde(default = "default_type_field")]
    pub type_field: String,

    /// Exact survey answer text to response type.
    #[serde(default = "default_response_types")]
    pub response_types: BTreeMap<String, ResponseType>,

    /// Recognized non-section fields per type.
    #[serde(default = "default_fields")]
    pub fields: PerType<Vec<String>>,

    /// Ordered sections rendered per type.
    #[serde(default = "default_sections")]
    pub sections: PerType<Vec<SectionSpec>>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            type_field: default_type_field(),
            response_types: default_response_types(),
            fields: default_fields(),
            sections: default_sections(),
        }
    }
}

fn default_type_field() -> String {
    "response-type".to_string()
}

fn default_response_types() -> BTreeMap<String, ResponseType> {
    [
        (
            "Reporting information you found in a news article or on social media?",
            ResponseType::Report,
        ),
        (
            "Providing a firsthand account or testimonial about a friend's experience or your own experiences?",
            ResponseType::Anecdote,
        ),
    ]
    .into_iter()
    .map(|(q, t)| (q.to_string(), t))
    .collect()
}

fn default_fields() -> PerType<Vec<String>> {
    let to_vec = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
    PerType {
        report: to_vec(&[
            "industry",
            "tags",
            "location",
            "scope",
            "worker-type",
            "company",
            "description",
        ]),
        anecdote: to_vec(&["industry", "tags", "location", "company", "description"]),
    }
}

fn default_sections() -> PerType<Vec<SectionSpec>> {
    PerType {
        report: vec![
            SectionSpec::new("impact", "Impact"),
            // Column name as published in the sheet.
            SectionSpec::new("company-respose", "Company response"),
            SectionSpec::new("relief", "Relief"),
            SectionSpec::new("barriers", "Barriers to relief"),
        ],
        anecdote: vec![
            SectionSpec::new("relief", "Relief"),
            SectionSpec::new("federal-relief", "Federal Relief"),
            SectionSpec::new("barriers", "Barriers to relief"),
        ],
    }
}

/// Page rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title, also the page title prefix.
    #[serde(default = "default_title")]
    pub title: String,

    /// Summaries tab column naming the industry.
    #[serde(default = "default_summary_industry_column")]
    pub summary_industry_column: String,

    /// Summaries tab column holding the text.
    #[serde(default = "default_summary_text_column")]
    pub summary_text_column: String,

    /// About tab column holding the text.
    #[serde(default = "default_about_text_column")]
    pub about_text_column: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            summary_industry_column: default_summary_industry_column(),
            summary_text_column: default_summary_text_column(),
            about_text_column: default_about_text_column(),
        }
    }
}

fn default_title() -> String {
    "COVID-19 Worker Impact".to_string()
}

fn default_summary_industry_column() -> String {
    "industry".to_string()
}

fn default_summary_text_column() -> String {
    "summary".to_string()
}

fn default_about_text_column() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.worker-impact.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref sheet_id) = args.sheet_id {
            self.feed.sheet_id = sheet_id.clone();
        }
        if let Some(tab) = args.tab {
            self.feed.responses_tab = tab;
        }
        if args.summary_tab.is_some() {
            self.feed.summaries_tab = args.summary_tab;
        }
        if args.about_tab.is_some() {
            self.feed.about_tab = args.about_tab;
        }
        if let Some(timeout) = args.timeout {
            self.feed.timeout_seconds = timeout;
        }
    }

    /// Check the merged settings before any feed is requested.
    pub fn validate(&self) -> Result<()> {
        let feed = &self.feed;
        if feed.sheet_id.trim().is_empty() || feed.sheet_id.contains('/') {
            bail!("feed.sheet_id {:?} is not a spreadsheet identifier", feed.sheet_id);
        }
        for (key, tab) in [
            ("responses_tab", Some(feed.responses_tab)),
            ("summaries_tab", feed.summaries_tab),
            ("about_tab", feed.about_tab),
        ] {
            if tab == Some(0) {
                bail!("feed.{} is 1-based and must be at least 1", key);
            }
        }
        if feed.timeout_seconds == 0 {
            bail!("feed.timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.responses_tab, 2);
        assert!(config.feed.summaries_tab.is_none());
        assert_eq!(config.survey.type_field, "response-type");
        assert_eq!(config.survey.response_types.len(), 2);
        assert_eq!(config.survey.sections.report.len(), 4);
        assert_eq!(config.survey.sections.anecdote[1].key, "federal-relief");
        assert_eq!(config.site.title, "COVID-19 Worker Impact");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[feed]
sheet_id = "abc123"
responses_tab = 3
summaries_tab = 4

[survey]
type_field = "kind"

[survey.response_types]
"News?" = "report"
"Story?" = "anecdote"

[site]
title = "Impact"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.feed.sheet_id, "abc123");
        assert_eq!(config.feed.responses_tab, 3);
        assert_eq!(config.feed.summaries_tab, Some(4));
        assert_eq!(config.feed.about_tab, None);
        assert_eq!(config.survey.type_field, "kind");
        assert_eq!(
            config.survey.response_types.get("Story?"),
            Some(&ResponseType::Anecdote)
        );
        // Unspecified tables keep their defaults.
        assert_eq!(config.survey.sections.report[0].title, "Impact");
        assert_eq!(config.site.title, "Impact");
        assert_eq!(config.site.summary_text_column, "summary");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[feed]"));
        assert!(toml_str.contains("[survey"));
        assert!(toml_str.contains("[site]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.survey.response_types.len(), 2);
        assert_eq!(reparsed.survey.sections.anecdote.len(), 3);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[feed]\nresponses_tab = 5\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.feed.responses_tab, 5);
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[feed\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_tab_and_timeout_from_file() {
        assert!(Config::default().validate().is_ok());

        let config: Config = toml::from_str("[feed]\nresponses_tab = 0\n").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("responses_tab"));

        let config: Config = toml::from_str("[feed]\nabout_tab = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[feed]\ntimeout_seconds = 0\n").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_seconds"));

        let config: Config = toml::from_str("[feed]\nsheet_id = \"a/b\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_after_cli_override() {
        use clap::Parser;

        let mut config: Config = toml::from_str("[feed]\nresponses_tab = 0\n").unwrap();
        let args = crate::cli::Args::try_parse_from(["worker-impact", "--tab", "3"]).unwrap();
        config.merge_with_args(&args);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_citation_key() {
        let spec = SectionSpec::new("relief", "Relief");
        assert_eq!(spec.citation_key(), "relief.citation");
    }
}
