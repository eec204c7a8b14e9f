//! Survey catalog: classification, grouping and search.
//!
//! Rows from the responses feed become [`Response`](crate::models::Response)s
//! grouped by industry and tag. Filtering never mutates the catalog; it
//! produces a [`CatalogView`] for the renderer.

pub mod annotations;
pub mod filter;
pub mod schema;
pub mod slug;
pub mod transform;

pub use annotations::{about_from_rows, summaries_from_rows};
pub use filter::{apply_filter, CatalogView, GroupView};
pub use schema::ResponseSchema;
pub use transform::transform;
