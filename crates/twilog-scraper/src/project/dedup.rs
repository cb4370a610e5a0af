//! Batch-level deduplication and final ordering.

use std::collections::HashSet;
use std::hash::Hash;

/// Keeps the first occurrence of each key, preserving order.
///
/// Applying it twice yields the same result as applying it once.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Turns a newest-first batch into persisted (oldest-first) order.
#[must_use]
pub fn chronological<T>(mut items: Vec<T>) -> Vec<T> {
    items.reverse();
    items
}

/// [`dedup_by_key`] followed by [`chronological`].
pub fn finalize<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    chronological(dedup_by_key(items, key))
}
