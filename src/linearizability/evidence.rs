//! Recording partial linearizations as evidence for diagnostic output.
use std::collections::HashMap;

use crate::linearizability::history::EntryId;

/// A caller-supplied, checker-opaque annotation threaded through unchanged
/// into [`LinearizationInfo`] — a timestamp, a tag, and an optional client,
/// meant for a visualizer to render alongside the checker's own evidence.
#[derive(Clone, Debug)]
pub struct Annotation {
    pub timestamp: u64,
    pub tag: String,
    pub client_id: Option<usize>,
}

/// A snapshot of committed calls during the search, in commit order.
///
/// Each element names the entry committed and a description of the model
/// state immediately after it was applied (see [`crate::Specification::describe_state`]).
/// The length of a `PartialLinearization` is the number of operations it
/// linearizes; only strictly-improving lengths are ever recorded (see
/// [`EvidenceRecorder`]).
#[derive(Clone, Debug, Default)]
pub struct PartialLinearization {
    pub entries: Vec<(EntryId, String)>,
}

impl PartialLinearization {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Raw call/return times for one entry, carried through to
/// [`LinearizationInfo`] for visualization.
#[derive(Clone, Debug)]
pub struct EntryTimes {
    pub id: EntryId,
    pub call_time: u64,
    /// `None` for an operation whose call was never matched by a return.
    pub return_time: Option<u64>,
}

/// Evidence produced by a single partition's search: the raw history, every
/// partial linearization that set a new length record during the search,
/// and for each operation the index of the longest one containing it.
#[derive(Clone, Debug, Default)]
pub struct LinearizationInfo {
    pub entries: Vec<EntryTimes>,
    pub partial_linearizations: Vec<PartialLinearization>,
    pub largest: HashMap<EntryId, usize>,
    pub annotations: Vec<Annotation>,
}

/// Tracks the longest partial linearization seen so far during a single
/// partition's search.
///
/// Only records a new [`PartialLinearization`] when the search commits more
/// calls than any previously-seen prefix in this partition — the recorded
/// list therefore only ever grows in length. For each entry appearing in a
/// newly-recorded (and therefore longest-so-far) linearization, `largest` is
/// updated to point at it.
pub(crate) struct EvidenceRecorder {
    partial_linearizations: Vec<PartialLinearization>,
    largest: HashMap<EntryId, usize>,
    best_len: usize,
}

impl EvidenceRecorder {
    pub(crate) fn new() -> Self {
        Self {
            partial_linearizations: Vec::new(),
            largest: HashMap::new(),
            best_len: 0,
        }
    }

    /// Considers the currently-committed calls stack as a candidate new
    /// record. `describe` maps a committed call's entry id to a description
    /// of the state immediately after it was applied.
    pub(crate) fn observe(&mut self, committed: &[(EntryId, String)]) {
        if committed.len() <= self.best_len {
            return;
        }
        let record = PartialLinearization {
            entries: committed.to_vec(),
        };
        let index = self.partial_linearizations.len();
        for &(id, _) in &record.entries {
            self.largest.insert(id, index);
        }
        self.best_len = record.len();
        self.partial_linearizations.push(record);
    }

    pub(crate) fn into_parts(self) -> (Vec<PartialLinearization>, HashMap<EntryId, usize>) {
        (self.partial_linearizations, self.largest)
    }
}
