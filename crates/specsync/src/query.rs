use crate::types::{CollectionItem, ItemKey};

/// Direct children of each top-level item, summed.
///
/// Counting is shallow and by item, not by kind: a sub-folder directly under
/// a top-level folder counts as one, its own contents do not, and a
/// top-level request contributes nothing.
pub fn count_requests(items: &[CollectionItem]) -> usize {
    items.iter().map(|item| item.children().len()).sum()
}

/// Depth-first walk yielding each item with its depth (0 for top level).
pub fn walk(items: &[CollectionItem]) -> Vec<(usize, &CollectionItem)> {
    let mut out = Vec::new();
    walk_into(items, 0, &mut out);
    out
}

fn walk_into<'a>(items: &'a [CollectionItem], depth: usize, out: &mut Vec<(usize, &'a CollectionItem)>) {
    for item in items {
        out.push((depth, item));
        walk_into(item.children(), depth + 1, out);
    }
}

/// Items flagged deleted, at any depth, in walk order.
pub fn retired(items: &[CollectionItem]) -> Vec<&CollectionItem> {
    walk(items)
        .into_iter()
        .filter_map(|(_, item)| item.is_deleted.then_some(item))
        .collect()
}

/// Items not flagged deleted, at any depth, in walk order.
pub fn live(items: &[CollectionItem]) -> Vec<&CollectionItem> {
    walk(items)
        .into_iter()
        .filter_map(|(_, item)| (!item.is_deleted).then_some(item))
        .collect()
}

/// First sibling with the given identity key.
pub fn find_by_key<'a>(items: &'a [CollectionItem], key: &ItemKey) -> Option<&'a CollectionItem> {
    items.iter().find(|item| &item.key() == key)
}
