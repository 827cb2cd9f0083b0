//! Structural model of the changelog document.
//!
//! A changelog is treated as three regions:
//!
//! - `preamble`: everything before the `## [Unreleased]` marker, preserved
//!   verbatim (title, intro prose, hand-written notes).
//! - managed region: the marker line plus everything up to (but excluding)
//!   the next `## [` heading, or end of document. This is the only part
//!   the sync engine may rewrite.
//! - `trailer`: everything from the next `## [` heading onward, preserved
//!   verbatim (released versions).
//!
//! There is no separate index of merged PRs: the ids embedded in the
//! managed region's reference links are the idempotency ledger. Parsing
//! never fails; a document without a recognizable marker is treated as
//! all-preamble and a fresh region is synthesized on the next merge.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use regex_lite::Regex;

use crate::models::Category;

/// The managed-region marker, always a literal level-2 heading.
pub const UNRELEASED_MARKER: &str = "## [Unreleased]";

/// A changelog split into its three regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    /// Verbatim text before the managed region.
    preamble: String,
    /// The managed region, marker line included, when one was found.
    region: Option<String>,
    /// Verbatim text from the next `## [` section onward.
    trailer: String,
}

impl Changelog {
    /// Split a document into preamble, managed region, and trailer.
    ///
    /// If the marker is absent the whole document becomes the preamble;
    /// this is the recovery path for hand-edited or empty documents.
    pub fn parse(raw: &str) -> Changelog {
        let Some(marker_at) = find_line_start(raw, UNRELEASED_MARKER) else {
            return Changelog {
                preamble: raw.to_string(),
                region: None,
                trailer: String::new(),
            };
        };

        let preamble = raw[..marker_at].to_string();
        let body_at = marker_at + UNRELEASED_MARKER.len();

        // The region runs until the next same-level section heading.
        match raw[body_at..].find("\n## [") {
            Some(offset) => {
                let trailer_at = body_at + offset;
                Changelog {
                    preamble,
                    region: Some(raw[marker_at..trailer_at].to_string()),
                    trailer: raw[trailer_at..].to_string(),
                }
            }
            None => Changelog {
                preamble,
                region: Some(raw[marker_at..].to_string()),
                trailer: String::new(),
            },
        }
    }

    /// Whether the document already contains a managed region.
    pub fn has_region(&self) -> bool {
        self.region.is_some()
    }

    /// All PR ids recorded in the managed region.
    ///
    /// Both the rendered suffix form `([#42](url))` and the bare `(#42)`
    /// form count; duplicates collapse. This set is the sole dedup ledger.
    pub fn existing_ids(&self) -> BTreeSet<u64> {
        let mut ids = BTreeSet::new();
        let Some(region) = &self.region else {
            return ids;
        };

        let pattern = Regex::new(r"\(\[?#(\d+)[\])]")
            .unwrap_or_else(|e| unreachable!("invalid id pattern: {e}"));
        for caps in pattern.captures_iter(region) {
            if let Some(id) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                ids.insert(id);
            }
        }
        ids
    }

    /// Re-read the managed region's bullet lines, grouped by category.
    ///
    /// Lines outside a recognized `### <Category>` subsection are ignored;
    /// their ids still participate in dedup via [`existing_ids`].
    ///
    /// [`existing_ids`]: Changelog::existing_ids
    pub fn entries_by_category(&self) -> BTreeMap<Category, Vec<String>> {
        let mut groups: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        let Some(region) = &self.region else {
            return groups;
        };

        let mut current: Option<Category> = None;
        for line in region.lines() {
            if let Some(name) = line.strip_prefix("### ") {
                current = Category::from_name(name.trim());
            } else if let (Some(cat), Some(text)) = (current, line.strip_prefix("- ")) {
                groups.entry(cat).or_default().push(text.to_string());
            }
        }
        groups
    }

    /// Reconstruct the document with a replacement managed region.
    ///
    /// `region` must be marker-inclusive text as produced by
    /// [`render_region`]. When the document had no region, one is inserted
    /// after the top-level title line (or at the start if there is none).
    pub fn with_region(&self, region: &str) -> String {
        if self.region.is_some() {
            let mut out =
                String::with_capacity(self.preamble.len() + region.len() + self.trailer.len());
            out.push_str(&self.preamble);
            out.push_str(region);
            // Non-empty trailers begin with the "\n## [" boundary, which
            // already provides the separating blank line.
            out.push_str(&self.trailer);
            return out;
        }

        match title_line_end(&self.preamble) {
            Some(at) => {
                let (head, rest) = self.preamble.split_at(at);
                let mut out = String::new();
                out.push_str(head);
                if !head.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
                out.push_str(region);
                let rest = rest.trim_start_matches('\n');
                if !rest.is_empty() {
                    out.push('\n');
                    out.push_str(rest);
                }
                out
            }
            None if self.preamble.is_empty() => region.to_string(),
            None => format!("{}\n{}", region, self.preamble),
        }
    }

    /// Reconstruct the document unchanged, byte-identical to the input.
    pub fn assemble(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.preamble);
        if let Some(region) = &self.region {
            out.push_str(region);
        }
        out.push_str(&self.trailer);
        out
    }
}

/// Render a managed region from grouped bullet texts.
///
/// Emits the marker line, then one `### <Category>` subsection per
/// non-empty group in enumeration order (the `BTreeMap` key order), one
/// `- ` bullet per entry in the order given. Empty groups are omitted.
pub fn render_region(groups: &BTreeMap<Category, Vec<String>>) -> String {
    let mut out = String::from(UNRELEASED_MARKER);
    out.push('\n');
    for (category, entries) in groups {
        if entries.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str("### ");
        out.push_str(category.name());
        out.push('\n');
        for entry in entries {
            out.push_str("- ");
            out.push_str(entry);
            out.push('\n');
        }
    }
    out
}

/// Find `needle` at the start of a line, returning its byte offset.
fn find_line_start(haystack: &str, needle: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = haystack[from..].find(needle) {
        let at = from + found;
        if at == 0 || haystack.as_bytes()[at - 1] == b'\n' {
            return Some(at);
        }
        from = at + 1;
    }
    None
}

/// Byte offset just past the first top-level `# ` title line, if any.
fn title_line_end(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with("# ") {
            return Some(offset + line.len());
        }
        offset += line.len();
    }
    None
}
