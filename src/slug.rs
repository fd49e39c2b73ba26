//! URL slugs for projects.
//!
//! `slugify` is pure; uniqueness is decided by `first_free_slug` against the
//! set of slugs already taken, which `db::projects::taken_slugs` loads in a
//! single query. The unique index on `projects.slug` remains the final word:
//! callers retry allocation when a write hits it.

use std::collections::HashSet;

/// Used when a title has no characters left after normalization.
pub const FALLBACK_SLUG: &str = "project";

/// Bound on allocate-then-write attempts before a slug conflict is surfaced.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Lowercase the title, keep `[a-z0-9]`, whitespace and `-`, and join the
/// remaining words with single hyphens.
///
/// The output contains no whitespace and never starts or ends with `-`, so
/// `slugify(slugify(t)) == slugify(t)`.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let slug = kept
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// `base` if nobody holds it, otherwise `base-1`, `base-2`, … the first one free.
pub fn first_free_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
