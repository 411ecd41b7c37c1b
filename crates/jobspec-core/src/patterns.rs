//! Glob patterns for branches, tags and paths.
//!
//! `*` and `?` never cross a `/`; `**` does. An empty pattern list matches
//! everything.

use globset::{Glob, GlobBuilder, GlobMatcher};

fn build(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Check that `pattern` is a well-formed glob.
pub fn check(pattern: &str) -> Result<(), String> {
    build(pattern).map(|_| ()).map_err(|e| e.to_string())
}

fn matcher(pattern: &str) -> Option<GlobMatcher> {
    match build(pattern) {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Ignoring malformed pattern");
            None
        }
    }
}

/// Whether `text` matches any of `patterns`. Malformed patterns never match.
pub fn matches_any(patterns: &[String], text: &str) -> bool {
    patterns.is_empty()
        || patterns
            .iter()
            .filter_map(|p| matcher(p))
            .any(|m| m.is_match(text))
}

/// Whether any of `files` matches any of `patterns`.
pub fn touches_any(patterns: &[String], files: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let matchers: Vec<GlobMatcher> = patterns.iter().filter_map(|p| matcher(p)).collect();
    files
        .iter()
        .any(|file| matchers.iter().any(|m| m.is_match(file)))
}
