//! Site state and the concurrent feed loads that fill it.
//!
//! The responses, summaries and about tabs are fetched independently. Each
//! completed load replaces its own slot of [`SiteState`] wholesale; a failed
//! load is logged and leaves its slot empty for the rest of the run.

use crate::catalog::{about_from_rows, summaries_from_rows, transform, ResponseSchema};
use crate::config::{FeedConfig, SiteConfig};
use crate::feed::{self, FeedError, FeedLoader};
use crate::models::{Catalog, Summaries};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// One of the independently loaded parts of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Responses,
    Summaries,
    About,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Responses => write!(f, "responses"),
            DataSource::Summaries => write!(f, "summaries"),
            DataSource::About => write!(f, "about"),
        }
    }
}

/// A completed load, ready to replace one slot.
#[derive(Debug, Clone)]
pub enum FeedUpdate {
    Responses(Catalog),
    Summaries(Summaries),
    About(String),
}

/// Everything the renderer reads. Absent slots have not loaded.
#[derive(Debug, Clone, Default)]
pub struct SiteState {
    catalog: Option<Catalog>,
    summaries: Option<Summaries>,
    about: Option<String>,
}

impl SiteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot the update belongs to.
    pub fn apply(&mut self, update: FeedUpdate) {
        match update {
            FeedUpdate::Responses(catalog) => self.catalog = Some(catalog),
            FeedUpdate::Summaries(summaries) => self.summaries = Some(summaries),
            FeedUpdate::About(text) => self.about = Some(text),
        }
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn summary(&self, industry_slug: &str) -> Option<&str> {
        self.summaries.as_ref()?.get(industry_slug)
    }

    pub fn summaries(&self) -> Option<&Summaries> {
        self.summaries.as_ref()
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }
}

/// Where the survey responses come from.
#[derive(Debug, Clone)]
pub enum ResponsesSource {
    /// A published tab.
    Tab(u32),
    /// A saved feed export.
    File(PathBuf),
}

/// Loads every configured tab into a [`SiteState`].
pub struct SiteLoader {
    loader: FeedLoader,
    sheet_id: String,
    responses: ResponsesSource,
    summaries_tab: Option<u32>,
    about_tab: Option<u32>,
    schema: ResponseSchema,
    site: SiteConfig,
}

impl SiteLoader {
    pub fn new(
        feed_config: &FeedConfig,
        responses: ResponsesSource,
        schema: ResponseSchema,
        site: SiteConfig,
    ) -> Result<Self, FeedError> {
        Ok(Self {
            loader: FeedLoader::new(&feed_config.base_url, feed_config.timeout_seconds)?,
            sheet_id: feed_config.sheet_id.clone(),
            responses,
            summaries_tab: feed_config.summaries_tab,
            about_tab: feed_config.about_tab,
            schema,
            site,
        })
    }

    /// URLs this loader would request.
    pub fn planned_urls(&self) -> Vec<(DataSource, String)> {
        let mut urls = Vec::new();
        if let ResponsesSource::Tab(tab) = self.responses {
            urls.push((DataSource::Responses, self.loader.url(&self.sheet_id, tab)));
        }
        if let Some(tab) = self.summaries_tab {
            urls.push((DataSource::Summaries, self.loader.url(&self.sheet_id, tab)));
        }
        if let Some(tab) = self.about_tab {
            urls.push((DataSource::About, self.loader.url(&self.sheet_id, tab)));
        }
        urls
    }

    /// Run all loads concurrently, applying each to `state` as it completes.
    ///
    /// Returns the sources that failed.
    pub async fn load_into(&self, state: &mut SiteState) -> Vec<DataSource> {
        let mut pending: FuturesUnordered<BoxFuture<'_, (DataSource, Result<FeedUpdate, FeedError>)>> =
            FuturesUnordered::new();

        pending.push(
            async move {
                let rows = match &self.responses {
                    ResponsesSource::Tab(tab) => self.loader.load(&self.sheet_id, *tab).await,
                    ResponsesSource::File(path) => feed::load_file(path).await,
                };
                let update = rows.map(|rows| {
                    let catalog = transform(&rows, &self.schema);
                    if catalog.is_empty() {
                        warn!("No usable responses among {} rows", rows.len());
                    }
                    FeedUpdate::Responses(catalog)
                });
                (DataSource::Responses, update)
            }
            .boxed(),
        );

        if let Some(tab) = self.summaries_tab {
            pending.push(
                async move {
                    let update = self.loader.load(&self.sheet_id, tab).await.map(|rows| {
                        FeedUpdate::Summaries(summaries_from_rows(
                            &rows,
                            &self.site.summary_industry_column,
                            &self.site.summary_text_column,
                        ))
                    });
                    (DataSource::Summaries, update)
                }
                .boxed(),
            );
        }

        if let Some(tab) = self.about_tab {
            pending.push(
                async move {
                    let update = self
                        .loader
                        .load(&self.sheet_id, tab)
                        .await
                        .map(|rows| FeedUpdate::About(about_from_rows(&rows, &self.site.about_text_column)));
                    (DataSource::About, update)
                }
                .boxed(),
            );
        }

        let mut failed = Vec::new();
        while let Some((source, result)) = pending.next().await {
            match result {
                Ok(update) => {
                    info!("Loaded {}", source);
                    state.apply(update);
                }
                Err(e) => {
                    error!("Failed to load {}: {}", source, e);
                    failed.push(source);
                }
            }
        }

        failed
    }
}
