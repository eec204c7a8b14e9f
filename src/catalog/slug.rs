//! URL-safe grouping keys.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").expect("non-word regex"));
static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("hyphen regex"));

/// Normalize free text into a slug made of `[a-z0-9_]`.
///
/// Steps run in a fixed order: lowercase, trim, whitespace runs to `_`,
/// drop everything outside `[A-Za-z0-9_-]`, hyphen runs to `_`.
/// Trimming first keeps leading and trailing underscores out.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let joined = WHITESPACE.replace_all(lowered.trim(), "_");
    let stripped = NON_WORD.replace_all(&joined, "");
    HYPHENS.replace_all(&stripped, "_").into_owned()
}
