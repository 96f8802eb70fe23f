//! Running a history's partitions concurrently, with cooperative
//! cancellation on the first `Illegal` verdict or an optional wall-clock
//! deadline.
use std::thread;
use std::time::{Duration, Instant};

use crate::linearizability::checker::{check_partition, Verdict};
use crate::linearizability::evidence::{Annotation, LinearizationInfo};
use crate::linearizability::history::Entry;
use crate::linearizability::sync::{Arc, AtomicBool, Ordering};
use crate::specifications::Specification;

/// The state shared between workers: one partition found to be `Illegal`
/// signals every other partition to stop via `failed`; an optional fixed
/// `deadline` is sampled against the monotonic clock on every poll rather
/// than pushed by a separate timer thread, so no background thread ever
/// outlives the search. `failed` is never cleared.
///
/// These are the *only* objects shared across partitions: there is no
/// lock on any partition's cache or linked list, and cancellation is
/// advisory — a worker observing `failed` set by a sibling may finish its
/// current recursion level before checking again.
#[derive(Clone)]
pub(crate) struct Cancellation {
    failed: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// No deadline: only cancelled by [`Cancellation::mark_failed`].
    pub(crate) fn new() -> Self {
        Self {
            failed: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Cancelled by [`Cancellation::mark_failed`] or once `deadline` has
    /// passed, whichever comes first.
    pub(crate) fn with_deadline(deadline: Instant) -> Self {
        Self {
            failed: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub(crate) fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Whether the deadline, if any, has passed as of this call.
    pub(crate) fn deadline_reached(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub(crate) fn mark_failed(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }
}

/// Runs one worker per partition (bounded by the host's parallelism; excess
/// partitions queue behind `std::thread::available_parallelism()` workers),
/// aggregating verdicts: `Ok` iff every partition is `Ok`,
/// `Illegal` if any partition is `Illegal`, else `Unknown` if any partition
/// is `Unknown`.
///
/// `timeout == Duration::ZERO` means unbounded, matching the crate's
/// external interface contract.
///
/// `annotations` are caller-supplied, checker-opaque diagnostics threaded
/// through unchanged into each partition's [`LinearizationInfo`]: an
/// annotation tagged with a `client_id` is attached to every partition that
/// contains an entry from that client; an untagged annotation is attached to
/// every partition.
pub(crate) fn run_partitions<S: Specification + Sync>(
    spec: &S,
    partitions: Vec<Vec<Entry<S::Operation>>>,
    timeout: Duration,
    annotations: Vec<Annotation>,
) -> (Verdict, Vec<LinearizationInfo>)
where
    S::Operation: Send,
{
    let cancel = if timeout == Duration::ZERO {
        Cancellation::new()
    } else {
        Cancellation::with_deadline(Instant::now() + timeout)
    };

    let max_workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let mut infos: Vec<LinearizationInfo> = Vec::with_capacity(partitions.len());
    let mut verdict = Verdict::Ok;

    for chunk in partitions.chunks(max_workers.max(1)) {
        if cancel.failed() {
            break;
        }
        let results: Vec<(Verdict, LinearizationInfo)> = thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|entries| {
                    let cancel = cancel.clone();
                    let entries = entries.clone();
                    scope.spawn(move || check_partition(spec, entries, &cancel))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for ((partition_verdict, mut info), entries) in results.into_iter().zip(chunk) {
            if partition_verdict == Verdict::Illegal {
                cancel.mark_failed();
            }
            verdict = aggregate(verdict, partition_verdict);
            info.annotations = annotations_for_partition(&annotations, entries);
            infos.push(info);
        }
    }

    (verdict, infos)
}

/// Selects the annotations relevant to one partition: untagged annotations
/// apply to every partition, client-tagged ones apply only to a partition
/// containing an entry from that client.
fn annotations_for_partition<Op>(
    annotations: &[Annotation],
    entries: &[Entry<Op>],
) -> Vec<Annotation> {
    annotations
        .iter()
        .filter(|a| match a.client_id {
            None => true,
            Some(client_id) => entries.iter().any(|e| e.client_id == client_id),
        })
        .cloned()
        .collect()
}

/// Combines two partition verdicts per the aggregation rule:
/// `Illegal` dominates everything, `Unknown` dominates `Ok`, and `Ok`
/// combined with `Ok` stays `Ok`.
fn aggregate(a: Verdict, b: Verdict) -> Verdict {
    use Verdict::*;
    match (a, b) {
        (Illegal, _) | (_, Illegal) => Illegal,
        (Unknown, _) | (_, Unknown) => Unknown,
        (Ok, Ok) => Ok,
    }
}
