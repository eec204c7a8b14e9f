//! Published spreadsheet feeds.
//!
//! This module fetches Google Sheets list feeds and flattens their
//! entries into [`RawRow`](crate::models::RawRow)s.

pub mod loader;

pub use loader::{load_file, FeedLoader};

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain or decode a feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Feed {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed feed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read feed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
