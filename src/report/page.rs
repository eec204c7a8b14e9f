//! Resolving a route against the site state.

use crate::catalog::{CatalogView, GroupView};
use crate::models::Response;
use crate::routes::Route;
use crate::site::SiteState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of rendering a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Found,
    Loading,
    NotFound,
}

/// One industry entry of the navigation bar.
#[derive(Debug, Clone, Serialize)]
pub struct NavLink<'v> {
    pub slug: &'v str,
    pub name: &'v str,
    pub selected: bool,
}

/// A titled list of responses.
#[derive(Debug, Clone, Serialize)]
pub struct Section<'v> {
    pub slug: &'v str,
    pub name: &'v str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'v str>,
    pub responses: Vec<&'v Response>,
}

impl<'v> Section<'v> {
    fn from_group(group: &GroupView<'v>, summary: Option<&'v str>) -> Self {
        Self {
            slug: group.slug,
            name: group.name,
            summary,
            responses: group.visible().collect(),
        }
    }
}

/// What the page body shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PageContent<'v> {
    Sections(Vec<Section<'v>>),
    About(&'v str),
    Loading,
    NotFound,
}

/// Everything needed to render one route.
#[derive(Debug, Clone, Serialize)]
pub struct Page<'v> {
    pub route: Route,
    pub title: String,
    pub query: String,
    pub navigation: Vec<NavLink<'v>>,
    pub content: PageContent<'v>,
    /// Rows left out of the catalog.
    pub skipped_rows: usize,
    pub generated_at: DateTime<Utc>,
}

impl Page<'_> {
    pub fn status(&self) -> PageStatus {
        match self.content {
            PageContent::Sections(_) | PageContent::About(_) => PageStatus::Found,
            PageContent::Loading => PageStatus::Loading,
            PageContent::NotFound => PageStatus::NotFound,
        }
    }
}

/// Build the page for `route` from the loaded state and a filtered view.
///
/// `view` must be the filtered projection of `state.catalog()`.
pub fn build_page<'v>(
    site_title: &str,
    state: &'v SiteState,
    view: Option<&'v CatalogView<'v>>,
    route: &Route,
) -> Page<'v> {
    let selected = match route {
        Route::Industry(slug) => Some(slug.as_str()),
        _ => None,
    };
    let navigation: Vec<NavLink<'v>> = view
        .map(|v| {
            v.industries
                .iter()
                .map(|g| NavLink {
                    slug: g.slug,
                    name: g.name,
                    selected: selected == Some(g.slug),
                })
                .collect()
        })
        .unwrap_or_default();

    let (content, heading) = resolve_content(state, view, route);

    let title = match (&content, heading) {
        (PageContent::NotFound, _) => format!("{} : 404", site_title),
        (_, Some(heading)) => format!("{} : {}", site_title, heading),
        (_, None) => site_title.to_string(),
    };

    Page {
        route: route.clone(),
        title,
        query: view.map(|v| v.query.clone()).unwrap_or_default(),
        navigation,
        content,
        skipped_rows: state.catalog().map(|c| c.skipped.len()).unwrap_or(0),
        generated_at: Utc::now(),
    }
}

fn resolve_content<'v>(
    state: &'v SiteState,
    view: Option<&'v CatalogView<'v>>,
    route: &Route,
) -> (PageContent<'v>, Option<&'v str>) {
    match (route, view) {
        (Route::About, _) => match state.about() {
            Some(text) => (PageContent::About(text), Some("About")),
            None => (PageContent::Loading, None),
        },
        (_, None) => (PageContent::Loading, None),
        (Route::All, Some(view)) => {
            let sections: Vec<Section<'v>> = view
                .industries
                .iter()
                .filter(|g| g.visible_count() > 0)
                .map(|g| Section::from_group(g, state.summary(g.slug)))
                .collect();
            if sections.is_empty() && !view.query.is_empty() {
                (PageContent::NotFound, None)
            } else {
                (PageContent::Sections(sections), None)
            }
        }
        (Route::Industry(slug), Some(view)) => {
            single_section(view.industries.is_empty(), view.industry(slug), |g| {
                state.summary(g.slug)
            })
        }
        (Route::Tag(slug), Some(view)) => {
            single_section(view.industries.is_empty(), view.tag(slug), |_| None)
        }
    }
}

fn single_section<'v>(
    catalog_empty: bool,
    group: Option<GroupView<'v>>,
    summary: impl Fn(&GroupView<'v>) -> Option<&'v str>,
) -> (PageContent<'v>, Option<&'v str>) {
    // An empty catalog means the responses have not arrived yet.
    if catalog_empty {
        return (PageContent::Loading, None);
    }
    match group {
        Some(g) if g.visible_count() > 0 => (
            PageContent::Sections(vec![Section::from_group(&g, summary(&g))]),
            Some(g.name),
        ),
        _ => (PageContent::NotFound, None),
    }
}
