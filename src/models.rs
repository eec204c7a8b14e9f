//! Data models for the worker impact site.
//!
//! This module contains the core data structures shared by the feed
//! loader, the transformer and the page renderer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Kind of survey submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Information found in a news article or on social media.
    Report,
    /// Firsthand account or testimonial.
    Anecdote,
}

impl ResponseType {
    /// Field-name prefix used by the spreadsheet columns of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Report => "report",
            ResponseType::Anecdote => "anecdote",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One spreadsheet row: field name to cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A survey submission with its type prefix stripped from every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Kind of submission.
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    /// Unprefixed field name to value.
    pub fields: BTreeMap<String, String>,
}

impl Response {
    pub fn new(response_type: ResponseType) -> Self {
        Self {
            response_type,
            fields: BTreeMap::new(),
        }
    }

    /// Look up a field, treating blank cells as absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn industry(&self) -> Option<&str> {
        self.get("industry")
    }

    pub fn tags(&self) -> Option<&str> {
        self.get("tags")
    }

    /// Every string value carried by the response, the type label included.
    pub fn string_values(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.response_type.as_str()).chain(self.fields.values().map(String::as_str))
    }
}

/// A named bucket of responses, by industry or by tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Grouping key.
    pub slug: String,
    /// First-seen display text.
    pub name: String,
    /// Indices into [`Catalog::responses`], in feed order.
    pub members: Vec<usize>,
}

/// Groups kept in first-appearance order with lookup by slug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    groups: Vec<Group>,
    by_slug: HashMap<String, usize>,
}

impl GroupIndex {
    /// Get the group for `slug`, creating it with `name` on first use.
    pub fn entry(&mut self, slug: &str, name: &str) -> &mut Group {
        let idx = match self.by_slug.get(slug) {
            Some(&idx) => idx,
            None => {
                self.groups.push(Group {
                    slug: slug.to_string(),
                    name: name.to_string(),
                    members: Vec::new(),
                });
                self.by_slug.insert(slug.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }

    pub fn get(&self, slug: &str) -> Option<&Group> {
        self.by_slug.get(slug).map(|&idx| &self.groups[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Why the transformer excluded a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The response-type answer is not in the configured mapping.
    UnknownResponseType { answer: Option<String> },
    /// No usable industry to group under.
    MissingIndustry,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownResponseType { answer: Some(a) } => {
                write!(f, "unrecognized response type {:?}", a)
            }
            SkipReason::UnknownResponseType { answer: None } => {
                write!(f, "missing response type")
            }
            SkipReason::MissingIndustry => write!(f, "missing industry"),
        }
    }
}

/// A row the transformer did not turn into a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Position of the row in the feed (0-indexed).
    pub row: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Every response of one feed load, grouped by industry and by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub responses: Vec<Response>,
    pub industries: GroupIndex,
    pub tags: GroupIndex,
    pub skipped: Vec<SkippedRow>,
}

impl Catalog {
    /// Responses of a group, in feed order.
    pub fn members<'a>(&'a self, group: &'a Group) -> impl Iterator<Item = &'a Response> + 'a {
        group.members.iter().map(move |&idx| &self.responses[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.industries.is_empty()
    }
}

/// Per-industry annotations, keyed by industry slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summaries(BTreeMap<String, String>);

impl Summaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.0.get(slug).map(String::as_str)
    }

    pub fn insert(&mut self, slug: String, text: String) {
        self.0.insert(slug, text);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
