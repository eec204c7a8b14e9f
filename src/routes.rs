//! Page paths of the site.

use serde::Serialize;
use std::fmt;

/// A page of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", content = "slug", rename_all = "lowercase")]
pub enum Route {
    /// Every industry.
    All,
    /// One industry by slug.
    Industry(String),
    /// One tag by slug.
    Tag(String),
    /// The about text.
    About,
}

impl Route {
    /// Parse `/`, `/about`, `/tags/<slug>` or `/<slug>`.
    pub fn parse(path: &str) -> Result<Self, String> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Ok(Route::All),
            ["about"] => Ok(Route::About),
            ["tags", slug] => Ok(Route::Tag(slug.to_string())),
            [slug] => Ok(Route::Industry(slug.to_string())),
            _ => Err(format!("Unknown page: {}", path)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::All => write!(f, "/"),
            Route::Industry(slug) => write!(f, "/{}", slug),
            Route::Tag(slug) => write!(f, "/tags/{}", slug),
            Route::About => write!(f, "/about"),
        }
    }
}
