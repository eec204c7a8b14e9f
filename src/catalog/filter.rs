//! Search filtering as a read-only projection of a catalog.

use crate::models::{Catalog, Group, Response};
use serde::Serialize;

/// A response as seen under a query.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResponseView<'a> {
    #[serde(flatten)]
    pub response: &'a Response,
    pub visible: bool,
}

/// A group with every member marked visible or hidden.
#[derive(Debug, Clone, Serialize)]
pub struct GroupView<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub responses: Vec<ResponseView<'a>>,
}

impl<'a> GroupView<'a> {
    /// Responses matching the query, in feed order.
    pub fn visible(&self) -> impl Iterator<Item = &'a Response> + '_ {
        self.responses
            .iter()
            .filter(|r| r.visible)
            .map(|r| r.response)
    }

    pub fn visible_count(&self) -> usize {
        self.responses.iter().filter(|r| r.visible).count()
    }
}

/// The whole catalog under one query.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView<'a> {
    pub query: String,
    /// Every industry in first-appearance order.
    pub industries: Vec<GroupView<'a>>,
    #[serde(skip)]
    catalog: &'a Catalog,
}

impl<'a> CatalogView<'a> {
    pub fn industry(&self, slug: &str) -> Option<GroupView<'a>> {
        self.catalog
            .industries
            .get(slug)
            .map(|group| view_group(self.catalog, &self.query, group))
    }

    pub fn tag(&self, slug: &str) -> Option<GroupView<'a>> {
        self.catalog
            .tags
            .get(slug)
            .map(|group| view_group(self.catalog, &self.query, group))
    }

    pub fn visible_count(&self) -> usize {
        self.industries.iter().map(GroupView::visible_count).sum()
    }
}

/// Whether any string value of `response` contains `query`, ignoring case.
///
/// Only the empty query matches everything; whitespace is part of the needle.
pub fn matches(response: &Response, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    response
        .string_values()
        .any(|value| value.to_lowercase().contains(&needle))
}

fn view_group<'a>(catalog: &'a Catalog, query: &str, group: &'a Group) -> GroupView<'a> {
    GroupView {
        slug: &group.slug,
        name: &group.name,
        responses: catalog
            .members(group)
            .map(|response| ResponseView {
                response,
                visible: matches(response, query),
            })
            .collect(),
    }
}

/// Project `catalog` under `query` without touching it.
pub fn apply_filter<'a>(catalog: &'a Catalog, query: &str) -> CatalogView<'a> {
    CatalogView {
        query: query.to_string(),
        industries: catalog
            .industries
            .iter()
            .map(|group| view_group(catalog, query, group))
            .collect(),
        catalog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{transform, ResponseSchema};
    use crate::models::{RawRow, ResponseType};

    const REPORT: &str = "Reporting information you found in a news article or on social media?";

    fn row(industry: &str, description: &str, tags: &str) -> RawRow {
        let mut row: RawRow = [
            ("report.industry", industry),
            ("report.description", description),
        ]
        .into_iter()
        .collect();
        if !tags.is_empty() {
            row.insert("report.tags", tags);
        }
        row.insert("response-type", REPORT);
        row
    }

    fn catalog() -> Catalog {
        let rows = vec![
            row("Commerce", "Retail store closed", "Shops"),
            row("Manufacturing", "Factory halted", "Shops, Plants"),
            row("Commerce", "Mall hours reduced", ""),
        ];
        transform(&rows, &ResponseSchema::default())
    }

    #[test]
    fn test_empty_query_shows_everything() {
        let catalog = catalog();
        let view = apply_filter(&catalog, "");
        assert!(view
            .industries
            .iter()
            .flat_map(|g| g.responses.iter())
            .all(|r| r.visible));
        assert!(view.tag("shops").unwrap().responses.iter().all(|r| r.visible));
        assert_eq!(view.visible_count(), 3);
    }

    #[test]
    fn test_whitespace_is_part_of_the_query() {
        let catalog = catalog();

        let view = apply_filter(&catalog, "   ");
        assert_eq!(view.query, "   ");
        assert_eq!(view.visible_count(), 0);

        let view = apply_filter(&catalog, " retail");
        assert_eq!(view.visible_count(), 0);

        let view = apply_filter(&catalog, "retail store");
        assert_eq!(view.visible_count(), 1);
    }

    #[test]
    fn test_matches_leading_space_only_after_a_word() {
        let mut response = Response::new(ResponseType::Report);
        response
            .fields
            .insert("description".to_string(), "Retail store closed".to_string());

        assert!(!matches(&response, " retail"));
        assert!(!matches(&response, "  "));
        assert!(matches(&response, " store"));
        assert!(matches(&response, ""));
    }

    #[test]
    fn test_unknown_group_lookup() {
        let catalog = catalog();
        let view = apply_filter(&catalog, "");
        assert!(view.industry("mining").is_none());
        assert!(view.tag("commerce").is_none());
    }

    #[test]
    fn test_query_matches_case_insensitively() {
        let catalog = catalog();
        let view = apply_filter(&catalog, "RETAIL");

        let commerce = view.industry("commerce").unwrap();
        let flags: Vec<bool> = commerce.responses.iter().map(|r| r.visible).collect();
        assert_eq!(flags, vec![true, false]);

        let manufacturing = view.industry("manufacturing").unwrap();
        assert_eq!(manufacturing.visible_count(), 0);
        assert_eq!(view.visible_count(), 1);
    }

    #[test]
    fn test_shared_response_has_same_visibility_in_every_group() {
        let catalog = catalog();
        let view = apply_filter(&catalog, "factory");

        assert_eq!(view.tag("shops").unwrap().visible_count(), 1);
        assert_eq!(view.tag("plants").unwrap().visible_count(), 1);
        assert_eq!(view.industry("manufacturing").unwrap().visible_count(), 1);
    }

    #[test]
    fn test_filter_does_not_mutate_catalog() {
        let catalog = catalog();
        let before = catalog.clone();
        let _ = apply_filter(&catalog, "factory");
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_matches_any_field_including_type() {
        let mut response = Response::new(ResponseType::Anecdote);
        response
            .fields
            .insert("location".to_string(), "Portland, OR".to_string());

        assert!(matches(&response, "portland"));
        assert!(matches(&response, "anecdote"));
        assert!(!matches(&response, "retail"));
    }

    #[test]
    fn test_visible_iterator_keeps_order() {
        let catalog = catalog();
        let view = apply_filter(&catalog, "commerce");
        let commerce = view.industry("commerce").unwrap();
        let descriptions: Vec<&str> = commerce
            .visible()
            .filter_map(|r| r.get("description"))
            .collect();
        assert_eq!(descriptions, vec!["Retail store closed", "Mall hours reduced"]);
    }
}
