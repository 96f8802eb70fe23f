//! The WGL/Lowe backtracking search, extended with cache-driven pruning,
//! overlap-window bounding, and cooperative cancellation.
use crate::bitset::Bitset;
use crate::linearizability::cache::LinearizationCache;
use crate::linearizability::evidence::{EntryTimes, EvidenceRecorder, LinearizationInfo};
use crate::linearizability::history::{Entry, PendingList};
use crate::linearizability::pool::Cancellation;
use crate::specifications::Specification;

/// The outcome of checking a history (or one of its partitions) against a
/// [`Specification`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// A full linearization consistent with real-time order was found.
    Ok,
    /// The search exhausted every candidate without finding one.
    Illegal,
    /// The wall-clock deadline elapsed before the search could conclude.
    Unknown,
}

/// One level of backtracking state.
///
/// `resume_from` is the pending-call id to try next if this commit is later
/// undone — it's simply `pending.next(committed)` captured right after
/// `committed` was lifted out of the list, since `lift` leaves the removed
/// node's own `next` pointer untouched (Lowe's trick). `description` is the
/// model state immediately after this call was applied, captured eagerly so
/// evidence snapshots don't need to replay the search.
struct Frame<State> {
    committed: usize,
    prev_state: State,
    resume_from: Option<usize>,
    description: String,
}

/// Checks a single partition's entries against `spec`, returning a verdict
/// and the evidence accumulated along the way.
///
/// This is the per-partition unit of work the worker pool dispatches; see
/// `crate::linearizability::pool` for how partitions are run concurrently
/// and cancelled.
pub(crate) fn check_partition<S: Specification>(
    spec: &S,
    entries: Vec<Entry<S::Operation>>,
    cancel: &Cancellation,
) -> (Verdict, LinearizationInfo) {
    let n = entries.len();
    let entry_times: Vec<EntryTimes> = entries
        .iter()
        .map(|e| EntryTimes {
            id: e.id,
            call_time: e.call_time,
            return_time: e.return_time,
        })
        .collect();

    if n == 0 {
        return (
            Verdict::Ok,
            LinearizationInfo {
                entries: entry_times,
                ..Default::default()
            },
        );
    }

    let mut pending = PendingList::new(&entries);
    let mut cache: LinearizationCache<S> = LinearizationCache::new();
    let mut evidence = EvidenceRecorder::new();

    let mut state = spec.init();
    let mut linearized = Bitset::new(n);
    let mut stack: Vec<Frame<S::State>> = Vec::new();
    // `None` means "this level hasn't been resumed, start from the head".
    let mut resume_from: Option<usize> = None;
    let mut fresh_level = true;

    let verdict = 'search: loop {
        let Some(head) = pending.head() else {
            break Verdict::Ok;
        };
        let bound = entries[head].return_time;

        let start = if fresh_level { Some(head) } else { resume_from };
        let mut candidate = start;
        let mut committed_this_level = false;

        while let Some(idx) = candidate {
            if let Some(b) = bound {
                if entries[idx].call_time > b {
                    break;
                }
            }

            // Polled once per candidate rather than once per level, so a
            // level with many overlapping but illegal/cached candidates
            // still yields at most one `apply` between polls.
            if cancel.failed() {
                break 'search Verdict::Illegal;
            }
            if cancel.deadline_reached() {
                break 'search Verdict::Unknown;
            }

            let (legal, next_state) = spec.apply(&entries[idx].op, &state);
            let newly_cached = if legal {
                let mut tentative = linearized.clone();
                tentative.set(idx);
                cache.insert(spec, tentative, &next_state)
            } else {
                false
            };

            if legal && newly_cached {
                pending.lift(idx);
                let description = spec.describe_state(&next_state);
                stack.push(Frame {
                    committed: idx,
                    prev_state: state.clone(),
                    resume_from: pending.next(idx),
                    description,
                });
                linearized.set(idx);
                state = next_state;
                committed_this_level = true;
                break;
            }

            candidate = pending.next(idx);
        }

        if committed_this_level {
            let committed: Vec<(usize, String)> = stack
                .iter()
                .map(|f| (f.committed, f.description.clone()))
                .collect();
            evidence.observe(&committed);
            fresh_level = true;
            continue;
        }

        match stack.pop() {
            None => break Verdict::Illegal,
            Some(frame) => {
                state = frame.prev_state;
                linearized.clear(frame.committed);
                pending.unlift(frame.committed);
                resume_from = frame.resume_from;
                fresh_level = false;
            }
        }
    };

    let (partial_linearizations, largest) = evidence.into_parts();
    let info = LinearizationInfo {
        entries: entry_times,
        partial_linearizations,
        largest,
        annotations: Vec::new(),
    };
    (verdict, info)
}
