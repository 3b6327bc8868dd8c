//! Reconcile a freshly built collection tree against a stored one.
//!
//! Siblings are matched by [`ItemKey`]. Spec items that disappeared upstream
//! are retired with `is_deleted`, user items are kept, and anything the spec
//! still declares takes the incoming values. Matched folders have their
//! children reconciled the same way, so the folder pass and the request pass
//! are one recursive algorithm.

use crate::types::{CollectionItem, ItemKey, ItemSource};
use std::collections::{HashMap, VecDeque};

/// What a merge did, summed over every depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Existing items replaced by a same-key incoming item.
    pub updated: usize,
    /// User items kept although the spec no longer declares them.
    pub preserved: usize,
    /// Spec items flagged deleted because the spec dropped them.
    pub retired: usize,
    /// Incoming items with no existing counterpart.
    pub added: usize,
}

/// Merge two sibling lists. See [`merge_with_stats`].
pub fn merge(existing: Vec<CollectionItem>, incoming: Vec<CollectionItem>) -> Vec<CollectionItem> {
    let mut stats = MergeStats::default();
    merge_with_stats(existing, incoming, &mut stats)
}

/// Merge `incoming` into `existing`.
///
/// Output order is every existing-derived item in existing order, followed by
/// the incoming items that were not paired with an existing one, in
/// incoming order.
///
/// - key present on both sides: the incoming item, live;
/// - existing only, `USER` source: the existing item, live;
/// - existing only, `SPEC` source: the existing item, retired;
/// - incoming only: the incoming item, live.
///
/// Folder children are merged recursively; the children of an existing-only
/// folder are merged against nothing, which retires its spec children.
///
/// A key that appears several times among the siblings is matched by
/// occurrence, so duplicates on both sides stay distinct items. Surplus
/// existing duplicates count as existing-only; surplus incoming ones are new.
pub fn merge_with_stats(
    existing: Vec<CollectionItem>,
    incoming: Vec<CollectionItem>,
    stats: &mut MergeStats,
) -> Vec<CollectionItem> {
    // Repeated keys pair up by occurrence: the nth existing item with a key
    // takes the nth incoming item with that key.
    let mut slots: HashMap<ItemKey, VecDeque<usize>> = HashMap::new();
    for (i, item) in incoming.iter().enumerate() {
        slots.entry(item.key()).or_default().push_back(i);
    }
    let mut incoming: Vec<Option<CollectionItem>> = incoming.into_iter().map(Some).collect();

    let mut merged = Vec::with_capacity(existing.len() + incoming.len());

    for mut current in existing {
        let paired = slots
            .get_mut(&current.key())
            .and_then(VecDeque::pop_front)
            .and_then(|i| incoming[i].take());
        match paired {
            Some(mut replacement) => {
                let next = replacement.take_children();
                let previous = current.take_children();
                adopt_children(&mut replacement, merge_with_stats(previous, next, stats));
                replacement.is_deleted = false;
                stats.updated += 1;
                merged.push(replacement);
            }
            None => {
                let previous = current.take_children();
                adopt_children(&mut current, merge_with_stats(previous, Vec::new(), stats));
                match current.source {
                    ItemSource::User => {
                        current.is_deleted = false;
                        stats.preserved += 1;
                    }
                    ItemSource::Spec => {
                        current.is_deleted = true;
                        stats.retired += 1;
                    }
                }
                merged.push(current);
            }
        }
    }

    for mut fresh in incoming.into_iter().flatten() {
        let children = fresh.take_children();
        adopt_children(&mut fresh, merge_with_stats(Vec::new(), children, stats));
        fresh.is_deleted = false;
        stats.added += 1;
        merged.push(fresh);
    }

    merged
}

fn adopt_children(item: &mut CollectionItem, children: Vec<CollectionItem>) {
    if let Some(items) = item.children_mut() {
        *items = children;
    }
}
