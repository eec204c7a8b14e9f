//! List feed fetching and parsing.
//!
//! A published tab is served as
//! `{ "feed": { "entry": [ { "gsx$<field>": { "$t": "<text>" }, ... } ] } }`.
//! Only `gsx$` keys carry sheet columns; the rest is feed metadata.

use super::FeedError;
use crate::models::RawRow;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const COLUMN_PREFIX: &str = "gsx$";
const TEXT_KEY: &str = "$t";

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
    // Google omits `entry` entirely for an empty tab.
    #[serde(default)]
    entry: Vec<HashMap<String, Value>>,
}

/// Build the list feed URL of one worksheet tab.
pub fn feed_url(base_url: &str, sheet_id: &str, tab: u32) -> String {
    format!(
        "{}/{}/{}/public/values?alt=json",
        base_url.trim_end_matches('/'),
        sheet_id,
        tab
    )
}

/// Parse a feed body into rows, preserving entry order.
pub fn parse_feed(body: &str) -> Result<Vec<RawRow>, FeedError> {
    let envelope: FeedEnvelope = serde_json::from_str(body)?;
    let rows: Vec<RawRow> = envelope.feed.entry.iter().map(parse_entry).collect();

    let blank = rows.iter().filter(|row| row.is_empty()).count();
    if blank > 0 {
        debug!("{} of {} entries carry no sheet columns", blank, rows.len());
    }
    Ok(rows)
}

fn parse_entry(entry: &HashMap<String, Value>) -> RawRow {
    let mut row = RawRow::new();
    for (key, value) in entry {
        let Some(field) = key.strip_prefix(COLUMN_PREFIX) else {
            continue;
        };
        if let Some(text) = value.get(TEXT_KEY).and_then(Value::as_str) {
            row.insert(field, text);
        }
    }
    row
}

/// Read a saved feed export from disk.
pub async fn load_file(path: &Path) -> Result<Vec<RawRow>, FeedError> {
    let body = tokio::fs::read_to_string(path).await.map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_feed(&body)?;
    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Fetches worksheet tabs of published spreadsheets.
#[derive(Debug, Clone)]
pub struct FeedLoader {
    http_client: reqwest::Client,
    base_url: String,
    timeout_seconds: u64,
}

impl FeedLoader {
    /// Create a loader for feeds under `base_url`.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, FeedError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(FeedError::Client)?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
            timeout_seconds,
        })
    }

    /// URL that [`load`](Self::load) requests for a tab.
    pub fn url(&self, sheet_id: &str, tab: u32) -> String {
        feed_url(&self.base_url, sheet_id, tab)
    }

    /// Fetch one tab. Every call issues a fresh request.
    pub async fn load(&self, sheet_id: &str, tab: u32) -> Result<Vec<RawRow>, FeedError> {
        let url = self.url(sheet_id, tab);
        debug!("Fetching feed: {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    FeedError::Timeout {
                        url: url.clone(),
                        seconds: self.timeout_seconds,
                    }
                } else {
                    FeedError::Request {
                        url: url.clone(),
                        source,
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FeedError::Request {
            url: url.clone(),
            source,
        })?;

        let rows = parse_feed(&body)?;
        info!("Fetched {} rows from tab {}", rows.len(), tab);
        Ok(rows)
    }
}
