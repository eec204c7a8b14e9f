//! Summaries and about text from their own feed tabs.

use super::slug::slugify;
use crate::models::{RawRow, Summaries};
use tracing::debug;

/// Collect per-industry summaries keyed by industry slug.
///
/// Rows with a blank industry or blank text are ignored; the first summary
/// for an industry wins.
pub fn summaries_from_rows(rows: &[RawRow], industry_column: &str, text_column: &str) -> Summaries {
    let mut summaries = Summaries::new();

    for row in rows {
        let Some(industry) = row.get(industry_column) else {
            continue;
        };
        let text = row.get(text_column).map(str::trim).unwrap_or_default();
        let slug = slugify(industry);
        if slug.is_empty() || text.is_empty() {
            continue;
        }
        if summaries.get(&slug).is_some() {
            debug!("Ignoring repeated summary for {}", slug);
            continue;
        }
        summaries.insert(slug, text.to_string());
    }

    summaries
}

/// Join the non-blank cells of `column` as paragraphs.
pub fn about_from_rows(rows: &[RawRow], column: &str) -> String {
    rows.iter()
        .filter_map(|row| row.get(column))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::loader::parse_feed;

    #[test]
    fn test_summaries_keyed_by_slug() {
        let rows = parse_feed(include_str!("../../fixtures/summaries.json")).unwrap();
        let summaries = summaries_from_rows(&rows, "industry", "summary");

        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries.get("retail_stores"),
            Some("Most large chains have closed storefronts.")
        );
        assert_eq!(summaries.get("manufacturing"), None);
    }

    #[test]
    fn test_first_summary_wins() {
        let rows: Vec<RawRow> = vec![
            [("industry", "Retail"), ("summary", "first")].into_iter().collect(),
            [("industry", "retail"), ("summary", "second")].into_iter().collect(),
        ];
        let summaries = summaries_from_rows(&rows, "industry", "summary");
        assert_eq!(summaries.get("retail"), Some("first"));
    }

    #[test]
    fn test_about_joins_paragraphs() {
        let rows = parse_feed(include_str!("../../fixtures/about.json")).unwrap();
        let about = about_from_rows(&rows, "text");
        assert_eq!(
            about,
            "This site collects reports about how COVID-19 affects workers.\n\n\
             Submissions come from a public survey."
        );
        assert_eq!(about_from_rows(&rows, "missing"), "");
    }
}
