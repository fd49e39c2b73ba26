//! Slug normalization and collision suffixes.
use std::collections::HashSet;

use freehub_backend::slug::{FALLBACK_SLUG, first_free_slug, slugify};

fn taken(slugs: &[&str]) -> HashSet<String> {
    slugs.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_slugify_normalizes_titles() {
    assert_eq!(slugify("Build a Logo"), "build-a-logo");
    assert_eq!(slugify("  React   Native  App!! "), "react-native-app");
    assert_eq!(slugify("C++ / Rust rewrite (v2)"), "c-rust-rewrite-v2");
    assert_eq!(slugify("-- leading and trailing --"), "leading-and-trailing");
    assert_eq!(slugify("Tab\tand\nnewline"), "tab-and-newline");
}

#[test]
fn test_slugify_falls_back_when_nothing_is_left() {
    assert_eq!(slugify("!!!"), FALLBACK_SLUG);
    assert_eq!(slugify(""), FALLBACK_SLUG);
    assert_eq!(slugify("日本語"), FALLBACK_SLUG);
}

#[test]
fn test_slugify_is_idempotent() {
    for title in ["Build a Logo", "  Many   spaces ", "mixed-Case_and_underscores", "?"] {
        let once = slugify(title);
        assert_eq!(slugify(&once), once, "title: {title:?}");
        assert!(!once.starts_with('-') && !once.ends_with('-'));
        assert!(!once.chars().any(char::is_whitespace));
    }
}

#[test]
fn test_first_free_slug_prefers_base() {
    assert_eq!(first_free_slug("build-a-logo", &taken(&[])), "build-a-logo");
    assert_eq!(
        first_free_slug("build-a-logo", &taken(&["build-a-logo-1"])),
        "build-a-logo"
    );
}

#[test]
fn test_first_free_slug_takes_lowest_free_suffix() {
    assert_eq!(
        first_free_slug("build-a-logo", &taken(&["build-a-logo"])),
        "build-a-logo-1"
    );
    assert_eq!(
        first_free_slug(
            "build-a-logo",
            &taken(&["build-a-logo", "build-a-logo-1", "build-a-logo-3"])
        ),
        "build-a-logo-2"
    );
}
