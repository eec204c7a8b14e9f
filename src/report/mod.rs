//! Page output.

pub mod generator;
pub mod page;

pub use generator::{generate_json_report, generate_markdown_report};
pub use page::{build_page, PageStatus};
