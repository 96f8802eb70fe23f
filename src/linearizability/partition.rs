//! Splitting a history into independently-checkable partitions.
use std::collections::HashMap;

use crate::linearizability::history::Entry;
use crate::specifications::{PartitionKey, Specification};

/// Splits `entries` into independent partitions using
/// [`Specification::partition_key`], re-numbering each partition's entries
/// `0..n` so that they can be used as bitset positions.
///
/// If no entry yields a key (the specification doesn't override
/// `partition_key`, or every operation returns `None`), the whole history is
/// returned as a single partition. Entries with `None` keys are grouped
/// into one shared partition alongside every keyed group, matching a
/// keyed-KV store where some operations (e.g. an administrative scan) don't
/// belong to any single key.
///
/// Correctness of this split relies on a caller obligation spelled out in
/// [`Specification::partition_key`]: operations in distinct partitions must
/// commute in every reachable state. The checker has no general way to
/// verify this and does not try.
pub(crate) fn partition_history<S: Specification>(
    spec: &S,
    entries: Vec<Entry<S::Operation>>,
) -> Vec<Vec<Entry<S::Operation>>> {
    let mut groups: HashMap<Option<PartitionKey>, Vec<Entry<S::Operation>>> = HashMap::new();
    let mut any_keyed = false;

    for entry in entries {
        let key = spec.partition_key(&entry.op);
        any_keyed |= key.is_some();
        groups.entry(key).or_default().push(entry);
    }

    if !any_keyed {
        // Either no entries, or none of them produced a key: one partition.
        return vec![groups.into_values().flatten().collect()];
    }

    groups
        .into_values()
        .map(|mut group| {
            group.sort_by_key(|e| e.id);
            renumber(group)
        })
        .collect()
}

/// Reassigns dense ids `0..n` to a partition's entries, preserving relative
/// order, so that entry ids can serve as bitset bit positions local to this
/// partition.
fn renumber<Op>(entries: Vec<Entry<Op>>) -> Vec<Entry<Op>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(new_id, mut entry)| {
            entry.id = new_id;
            entry
        })
        .collect()
}
