//! Core data model for changelog synchronization.
//!
//! - [`ChangeRecord`]: one merged pull request, normalized regardless of
//!   whether it came from the GitHub API or from local git history.
//! - [`Category`]: the Keep a Changelog taxonomy a record is filed under.
//! - [`RenderedEntry`]: one literal bullet line of the unreleased section.

use serde::{Deserialize, Serialize};

/// One merged change, built fresh on every fetch and never mutated.
///
/// The `id` (PR number) is the sole deduplication key: a record whose id
/// already appears in the changelog's unreleased section is never merged
/// a second time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Pull request number, stable across re-fetches.
    pub id: u64,
    /// PR title, always present.
    pub title: String,
    /// PR body, may be empty (always empty for git-history records).
    pub body: String,
    /// Label names, lowercased on ingest. Empty for git-history records.
    pub labels: Vec<String>,
    /// Canonical link to the change.
    pub url: String,
}

/// Keep a Changelog category.
///
/// The enumeration order is significant: it is both the tie-break order
/// for classification and the vertical order sections are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl Category {
    /// All categories in rendering order.
    pub const ALL: [Category; 6] = [
        Category::Added,
        Category::Changed,
        Category::Deprecated,
        Category::Removed,
        Category::Fixed,
        Category::Security,
    ];

    /// The `### <name>` subheading text for this category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Added => "Added",
            Category::Changed => "Changed",
            Category::Deprecated => "Deprecated",
            Category::Removed => "Removed",
            Category::Fixed => "Fixed",
            Category::Security => "Security",
        }
    }

    /// Look up a category by its subheading text.
    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static label/keyword to category rule table.
///
/// The slice order is authoritative: when a record carries several mapped
/// labels, or its text contains several mapped keywords, the first rule in
/// this table wins. The order is documented behavior, not alphabetical.
pub const LABEL_RULES: &[(&str, Category)] = &[
    ("feature", Category::Added),
    ("enhancement", Category::Added),
    ("added", Category::Added),
    ("add", Category::Added),
    ("new", Category::Added),
    ("bug", Category::Fixed),
    ("bugfix", Category::Fixed),
    ("fix", Category::Fixed),
    ("fixed", Category::Fixed),
    ("breaking", Category::Changed),
    ("breaking-change", Category::Changed),
    ("changed", Category::Changed),
    ("change", Category::Changed),
    ("deprecated", Category::Deprecated),
    ("removed", Category::Removed),
    ("security", Category::Security),
];

/// One literal line of the unreleased section, immutable once produced.
///
/// Normal form: `<description> ([#<id>](<url>))`. Fallback form (when no
/// usable description survives): `PR #<id> (<url>)`, which already embeds
/// the link and skips the suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    /// The record id this line was rendered from.
    pub id: u64,
    /// The full bullet text, without the leading `- `.
    pub line: String,
}
