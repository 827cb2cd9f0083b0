//! The merge engine: fetch, filter, classify, render, merge.
//!
//! Two invocation modes exist. Single-record mode handles one merge event:
//! the record arrives by parameter, and if its id is new it is inserted at
//! the front of its category (newest first), everything else preserved.
//! Bulk mode backfills from history: already-present ids are filtered out
//! and the managed region is rebuilt from the survivors.
//!
//! Bulk mode's default is the wholesale **replace** the original tool
//! performed: previously rendered entries whose ids the new fetch does not
//! cover are dropped. [`BulkMode::Merge`] keeps them instead, prepending
//! the survivors to each category's existing list.
//!
//! The engine works on document text and returns new text; reading and
//! writing the file belongs to the command layer, which does whole-file
//! replacement only (never a partial write).

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::classify::classify;
use crate::document::{Changelog, render_region};
use crate::models::{Category, ChangeRecord};
use crate::render::render;

/// How bulk mode combines survivors with the existing managed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkMode {
    /// Rebuild the region from the fetched survivors alone. Lossy when
    /// the fetch does not cover every previously merged id.
    Replace,
    /// Prepend survivors to each category's existing entries.
    Merge,
}

/// One entry merged by a synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEntry {
    pub id: u64,
    pub category: Category,
}

/// Result of one synchronization pass over the document text.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Every candidate was already present (or there were none); the
    /// document is byte-unchanged.
    NoOp { skipped: usize },
    /// The document changed; `text` is the full replacement content.
    Updated {
        text: String,
        merged: Vec<MergedEntry>,
        skipped: usize,
    },
}

impl SyncOutcome {
    /// Whether this pass produced new document text.
    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

/// Merge a single record into the document (merge-event path).
///
/// An id already present in the managed region is a no-op; otherwise the
/// rendered entry goes to the front of its category's list and all other
/// entries stay untouched.
pub fn sync_single(raw: &str, record: &ChangeRecord) -> SyncOutcome {
    let doc = Changelog::parse(raw);
    if doc.existing_ids().contains(&record.id) {
        return SyncOutcome::NoOp { skipped: 1 };
    }

    let category = classify(&record.title, &record.body, &record.labels);
    let entry = render(record);

    let mut groups = doc.entries_by_category();
    groups.entry(category).or_default().insert(0, entry.line);

    SyncOutcome::Updated {
        text: doc.with_region(&render_region(&groups)),
        merged: vec![MergedEntry {
            id: record.id,
            category,
        }],
        skipped: 0,
    }
}

/// Merge a batch of fetched records into the document (backfill path).
///
/// Records whose ids are already present are skipped, as are same-id
/// duplicates within the batch itself; fetch order is preserved within
/// each category.
pub fn sync_bulk(raw: &str, records: &[ChangeRecord], mode: BulkMode) -> SyncOutcome {
    let doc = Changelog::parse(raw);
    let existing = doc.existing_ids();

    let mut seen = BTreeSet::new();
    let survivors: Vec<&ChangeRecord> = records
        .iter()
        .filter(|r| !existing.contains(&r.id) && seen.insert(r.id))
        .collect();
    let skipped = records.len() - survivors.len();

    if survivors.is_empty() {
        return SyncOutcome::NoOp { skipped };
    }

    let mut groups: BTreeMap<Category, Vec<String>> = BTreeMap::new();
    let mut merged = Vec::new();
    for record in survivors {
        let category = classify(&record.title, &record.body, &record.labels);
        let entry = render(record);
        groups.entry(category).or_default().push(entry.line);
        merged.push(MergedEntry {
            id: record.id,
            category,
        });
    }

    if mode == BulkMode::Merge {
        for (category, entries) in doc.entries_by_category() {
            groups.entry(category).or_default().extend(entries);
        }
    }

    SyncOutcome::Updated {
        text: doc.with_region(&render_region(&groups)),
        merged,
        skipped,
    }
}
