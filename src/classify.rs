//! Classifies a change record into exactly one changelog category.

use crate::models::{Category, LABEL_RULES};

/// Determine the category for a merged change.
///
/// Rule precedence, first match wins:
/// 1. Rule-table keys scanned against the label set. The table's own order
///    decides ties when a record carries several mapped labels.
/// 2. The same keys as case-insensitive substrings of `title + " " + body`.
/// 3. Default: [`Category::Changed`].
///
/// Pure function: identical inputs always yield the identical category.
pub fn classify(title: &str, body: &str, labels: &[String]) -> Category {
    for (key, category) in LABEL_RULES {
        if labels.iter().any(|l| l == key) {
            return *category;
        }
    }

    let combined = format!("{} {}", title, body).to_lowercase();
    for (key, category) in LABEL_RULES {
        if combined.contains(key) {
            return *category;
        }
    }

    Category::Changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_label_match_wins_over_keywords() {
        // Title says "fix" but the label says feature.
        let cat = classify("fix the cache", "", &labels(&["feature"]));
        assert_eq!(cat, Category::Added);
    }

    #[test]
    fn test_label_tie_break_uses_table_order() {
        // "feature" precedes "bug" in the rule table, regardless of the
        // order the labels arrive in.
        let cat = classify("something", "", &labels(&["bug", "feature"]));
        assert_eq!(cat, Category::Added);
        let cat = classify("something", "", &labels(&["feature", "bug"]));
        assert_eq!(cat, Category::Added);
    }

    #[test]
    fn test_keyword_scan_over_title_and_body() {
        assert_eq!(classify("Fix flaky test", "", &[]), Category::Fixed);
        assert_eq!(
            classify("update docs", "this deprecated the old API", &[]),
            Category::Deprecated
        );
        assert_eq!(classify("Security hardening", "", &[]), Category::Security);
    }

    #[test]
    fn test_keyword_scan_is_case_insensitive() {
        assert_eq!(classify("ADD a NEW thing", "", &[]), Category::Added);
    }

    #[test]
    fn test_unmapped_label_falls_through_to_keywords() {
        let cat = classify("removed legacy codepath", "", &labels(&["ci"]));
        assert_eq!(cat, Category::Removed);
    }

    #[test]
    fn test_default_is_changed() {
        assert_eq!(classify("misc tweaks", "", &[]), Category::Changed);
    }

    #[test]
    fn test_deterministic() {
        let l = labels(&["enhancement"]);
        let first = classify("t", "b", &l);
        for _ in 0..10 {
            assert_eq!(classify("t", "b", &l), first);
        }
    }
}
