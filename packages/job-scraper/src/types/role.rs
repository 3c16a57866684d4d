//! Role names and the URL slugs derived from them.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9_\s-]").unwrap();
    static ref WHITESPACE_RUNS: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHEN_RUNS: Regex = Regex::new(r"-+").unwrap();
}

/// Turn a free-text role name into the slug used in portal search URLs.
///
/// `+` and `#` are spelled out so that "C++" and "C#" stay distinguishable.
/// Only ASCII word characters, whitespace and hyphens survive. Applying
/// `slugify` to its own output returns the same string.
pub fn slugify(role: &str) -> String {
    let lowered = role
        .trim()
        .to_lowercase()
        .replace('+', "plus")
        .replace('#', "sharp");
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUNS.replace_all(stripped.trim(), "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}
