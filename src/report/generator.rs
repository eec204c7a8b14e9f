//! Markdown and JSON page generation.
//!
//! This module turns a resolved [`Page`] into the text written to disk.

use super::page::{NavLink, Page, PageContent, Section};
use crate::catalog::ResponseSchema;
use crate::config::SectionSpec;
use crate::models::{Response, ResponseType};
use anyhow::Result;

const LOADING: &str = "Loading...";
const NOTHING_FOUND: &str = "Sorry, nothing found.";

/// Generate a complete Markdown page.
pub fn generate_markdown_report(page: &Page<'_>, schema: &ResponseSchema) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", page.title));

    // Navigation
    output.push_str(&generate_navigation(&page.navigation));

    if !page.query.is_empty() {
        output.push_str(&format!(
            "*Showing responses matching \"{}\"*\n\n",
            page.query
        ));
    }

    match &page.content {
        PageContent::Sections(sections) => {
            for section in sections {
                output.push_str(&generate_section(section, schema));
            }
        }
        PageContent::About(text) => {
            output.push_str("## About\n\n");
            output.push_str(text);
            output.push_str("\n\n");
        }
        PageContent::Loading => output.push_str(&format!("**{}**\n\n", LOADING)),
        PageContent::NotFound => output.push_str(&format!("**{}**\n\n", NOTHING_FOUND)),
    }

    output.push_str(&generate_footer(page));

    output
}

/// Generate the industry navigation list.
fn generate_navigation(links: &[NavLink<'_>]) -> String {
    let mut nav = String::new();

    nav.push_str("## View by industry\n\n");

    let any_selected = links.iter().any(|l| l.selected);
    nav.push_str(&nav_item("All", "/", !any_selected));
    for link in links {
        nav.push_str(&nav_item(link.name, &format!("/{}", link.slug), link.selected));
    }
    nav.push('\n');

    nav
}

fn nav_item(name: &str, href: &str, selected: bool) -> String {
    if selected {
        format!("- **[{}]({})**\n", name, href)
    } else {
        format!("- [{}]({})\n", name, href)
    }
}

/// Generate one group section.
fn generate_section(section: &Section<'_>, schema: &ResponseSchema) -> String {
    let mut out = String::new();

    out.push_str(&format!("## {}\n\n", section.name));

    if let Some(summary) = section.summary {
        out.push_str(&format!("> {}\n\n", summary.replace('\n', "\n> ")));
    }

    for response in &section.responses {
        out.push_str(&generate_response_block(response, schema.sections(response.response_type)));
    }

    out
}

/// Generate a single response block.
fn generate_response_block(response: &Response, sections: &[SectionSpec]) -> String {
    let mut block = String::new();

    block.push_str(&format!("###### {}\n\n", response.response_type));

    if let Some(scope) = scope_line(response) {
        block.push_str(&format!("#### {}\n\n", scope));
    }
    if let Some(location) = response.get("location") {
        block.push_str(&format!("#### {}\n\n", location));
    }
    if response.response_type == ResponseType::Anecdote {
        if let Some(description) = response.get("description") {
            block.push_str(&format!("{}\n\n", description));
        }
    }

    for spec in sections {
        let Some(text) = response.get(&spec.key) else {
            continue;
        };
        block.push_str(&format!("##### {}\n\n{}\n\n", spec.title, text));

        if let Some(citations) = response.get(&spec.citation_key()) {
            for url in citation_urls(citations) {
                block.push_str(&format!("- [{}]({})\n", citation_label(url), url));
            }
            block.push('\n');
        }
    }

    block.push_str("---\n\n");

    block
}

/// Who the response is about, as shown under its type.
pub fn scope_line(response: &Response) -> Option<String> {
    if response.response_type == ResponseType::Anecdote {
        return response.get("company").map(str::to_string);
    }

    let scope = response.get("scope")?;
    let line = match scope {
        "Class or group of workers" => {
            let workers = response.get("worker-type").unwrap_or_default();
            format!("{} Workers", workers).trim_start().to_string()
        }
        "Specific business or company" => {
            let company = response.get("company").unwrap_or_default();
            format!("{} Company", company).trim_start().to_string()
        }
        other => other.to_string(),
    };
    Some(line)
}

/// Non-blank lines of a citation cell.
pub fn citation_urls(cell: &str) -> impl Iterator<Item = &str> {
    cell.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Link text for a citation: the URL without its query string.
pub fn citation_label(url: &str) -> &str {
    match url.find('?') {
        Some(idx) if idx + 1 < url.len() => &url[..idx],
        _ => url,
    }
}

/// Generate the page footer.
fn generate_footer(page: &Page<'_>) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Page `{}` generated {}*\n",
        page.route,
        page.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    footer
}

/// Generate a JSON page.
pub fn generate_json_report(page: &Page<'_>) -> Result<String> {
    serde_json::to_string_pretty(page).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{apply_filter, transform};
    use crate::feed::loader::parse_feed;
    use crate::report::page::build_page;
    use crate::routes::Route;
    use crate::site::{FeedUpdate, SiteState};

    const TITLE: &str = "COVID-19 Worker Impact";

    fn response(response_type: ResponseType, fields: &[(&str, &str)]) -> Response {
        let mut r = Response::new(response_type);
        for (k, v) in fields {
            r.fields.insert(k.to_string(), v.to_string());
        }
        r
    }

    fn fixture_state() -> SiteState {
        let rows = parse_feed(include_str!("../../fixtures/feed.json")).unwrap();
        let mut state = SiteState::new();
        state.apply(FeedUpdate::Responses(transform(&rows, &ResponseSchema::default())));
        state
    }

    #[test]
    fn test_generate_markdown_report() {
        let state = fixture_state();
        let view = apply_filter(state.catalog().unwrap(), "");
        let page = build_page(TITLE, &state, Some(&view), &Route::All);
        let markdown = generate_markdown_report(&page, &ResponseSchema::default());

        assert!(markdown.starts_with("# COVID-19 Worker Impact\n"));
        assert!(markdown.contains("## View by industry"));
        assert!(markdown.contains("- **[All](/)**"));
        assert!(markdown.contains("- [Retail (Stores)](/retail_stores)"));
        assert!(markdown.contains("## Manufacturing"));
        assert!(markdown.contains("#### Acme Mart Company"));
        assert!(markdown.contains("#### Assembly line Workers"));
        assert!(markdown.contains("##### Impact\n\nAll stores closed for two weeks."));
        assert!(markdown.contains(
            "- [https://news.example.com/acme](https://news.example.com/acme?utm_source=tw)"
        ));
        assert!(markdown.contains("My hours were cut in half."));
        assert!(markdown.contains("##### Federal Relief"));
    }

    #[test]
    fn test_markdown_loading_and_not_found() {
        let empty = SiteState::new();
        let page = build_page(TITLE, &empty, None, &Route::Industry("retail".to_string()));
        let markdown = generate_markdown_report(&page, &ResponseSchema::default());
        assert!(markdown.contains("**Loading...**"));

        let state = fixture_state();
        let view = apply_filter(state.catalog().unwrap(), "");
        let page = build_page(TITLE, &state, Some(&view), &Route::Industry("mining".to_string()));
        let markdown = generate_markdown_report(&page, &ResponseSchema::default());
        assert!(markdown.starts_with("# COVID-19 Worker Impact : 404"));
        assert!(markdown.contains("**Sorry, nothing found.**"));
    }

    #[test]
    fn test_selected_industry_is_marked() {
        let state = fixture_state();
        let view = apply_filter(state.catalog().unwrap(), "");
        let page = build_page(TITLE, &state, Some(&view), &Route::Industry("retail".to_string()));
        let markdown = generate_markdown_report(&page, &ResponseSchema::default());

        assert!(markdown.contains("- [All](/)"));
        assert!(markdown.contains("- **[retail](/retail)**"));
    }

    #[test]
    fn test_summary_is_quoted() {
        let section = Section {
            slug: "retail",
            name: "Retail",
            summary: Some("Line one\nLine two"),
            responses: vec![],
        };
        let out = generate_section(&section, &ResponseSchema::default());
        assert!(out.contains("> Line one\n> Line two"));
    }

    #[test]
    fn test_scope_line() {
        let company = response(
            ResponseType::Report,
            &[("scope", "Specific business or company"), ("company", "Acme")],
        );
        assert_eq!(scope_line(&company), Some("Acme Company".to_string()));

        let workers = response(ResponseType::Report, &[("scope", "Class or group of workers")]);
        assert_eq!(scope_line(&workers), Some("Workers".to_string()));

        let other = response(ResponseType::Report, &[("scope", "Entire industry")]);
        assert_eq!(scope_line(&other), Some("Entire industry".to_string()));

        let none = response(ResponseType::Report, &[("company", "Acme")]);
        assert_eq!(scope_line(&none), None);

        let anecdote = response(
            ResponseType::Anecdote,
            &[("scope", "Entire industry"), ("company", "Corner Books")],
        );
        assert_eq!(scope_line(&anecdote), Some("Corner Books".to_string()));
    }

    #[test]
    fn test_citation_label() {
        assert_eq!(citation_label("https://a.com/x?utm=1"), "https://a.com/x");
        assert_eq!(citation_label("https://a.com/x?"), "https://a.com/x?");
        assert_eq!(citation_label("https://a.com/x"), "https://a.com/x");
    }

    #[test]
    fn test_citation_urls_skip_blank_lines() {
        let urls: Vec<&str> = citation_urls("https://a.com\r\n\n  https://b.com  \n").collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com"]);
    }

    #[test]
    fn test_generate_json_report() {
        let state = fixture_state();
        let view = apply_filter(state.catalog().unwrap(), "factory");
        let page = build_page(TITLE, &state, Some(&view), &Route::All);
        let json = generate_json_report(&page).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["route"]["page"], "all");
        assert_eq!(value["query"], "factory");
        assert_eq!(value["skipped_rows"], 1);
        assert_eq!(value["content"]["kind"], "sections");
        let sections = value["content"]["data"].as_array().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0]["slug"], "manufacturing");
        assert_eq!(sections[0]["responses"][0]["type"], "report");
        assert_eq!(
            sections[0]["responses"][0]["fields"]["description"],
            "Factory halted"
        );
    }
}
