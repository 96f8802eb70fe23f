//! Checking [linearizability](https://en.wikipedia.org/wiki/Linearizability) of a
//! concurrent history against a sequential [`Specification`](crate::Specification).
//!
//! An implementation of the algorithm originally defined by Jeannette Wing and
//! Chun Gong [\[WG93\]](https://www.cs.cmu.edu/~wing/publications/WingGong93.pdf),
//! extended by Gavin Lowe [\[L17\]](http://www.cs.ox.ac.uk/people/gavin.lowe/LinearizabiltyTesting/),
//! following the description given by Alex Horn and Daniel Kroening
//! [\[HK15\]](https://arxiv.org/abs/1504.00204): a backtracking search over the
//! pending calls in a history, memoized by a cache of visited
//! (linearized-set, state) pairs, run independently per partition and in
//! parallel across partitions.
//!
//! For a Go implementation, see [Porcupine](https://github.com/anishathalye/porcupine).
//! For a C++ implementation, see [`linearizability-checker`](https://github.com/ahorn/linearizability-checker).
//!
//! # Examples
//!
//! ```
//! use todc_linearize::specifications::{structural_equal, structural_hash};
//! use todc_linearize::{check_operations, Operation, Specification};
//!
//! #[derive(Copy, Clone, Debug)]
//! enum RegisterOp {
//!     Read(u32),
//!     Write(u32),
//! }
//! use RegisterOp::{Read, Write};
//!
//! struct RegisterSpec;
//!
//! impl Specification for RegisterSpec {
//!     type State = u32;
//!     type Operation = RegisterOp;
//!
//!     fn init(&self) -> Self::State {
//!         0
//!     }
//!
//!     fn apply(&self, op: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
//!         match op {
//!             Read(value) => (value == state, *state),
//!             Write(value) => (true, *value),
//!         }
//!     }
//!
//!     fn equal(&self, a: &Self::State, b: &Self::State) -> bool {
//!         structural_equal(a, b)
//!     }
//!
//!     fn state_hash(&self, state: &Self::State) -> u64 {
//!         structural_hash(state)
//!     }
//! }
//!
//! let history = vec![
//!     Operation::new(0, Write(1), 0, 1),
//!     Operation::new(1, Read(1), 2, 3),
//! ];
//! assert!(check_operations(&RegisterSpec, history));
//! ```
use std::time::Duration;

use crate::linearizability::history::{normalize_events, normalize_operations};
use crate::linearizability::pool::run_partitions;
use crate::specifications::Specification;

pub(crate) mod cache;
pub(crate) mod checker;
pub(crate) mod evidence;
pub mod history;
pub(crate) mod partition;
pub(crate) mod pool;
pub(crate) mod sync;

pub use checker::Verdict;
pub use evidence::{Annotation, EntryTimes, LinearizationInfo, PartialLinearization};
pub use history::{Event, EventKind, EntryId, Operation, ProcessId};

/// Returns whether `ops` has a linearization consistent with real-time order
/// that is legal against `spec`.
///
/// This is a convenience wrapper around [`check_operations_verbose`] with an
/// unbounded timeout, for callers who only care about the yes/no answer. See
/// the module documentation for an example.
pub fn check_operations<S: Specification + Sync>(spec: &S, ops: Vec<Operation<S::Operation>>) -> bool
where
    S::Operation: Send,
{
    check_operations_verbose(spec, ops, Duration::ZERO).0 == Verdict::Ok
}

/// Checks `ops` against `spec`, returning both the [`Verdict`] and evidence
/// (one [`LinearizationInfo`] per partition) suitable for diagnostics or
/// visualization.
///
/// `timeout == Duration::ZERO` means unbounded. If the model provides
/// [`Specification::partition_key`], `ops` is split into independently
/// checked partitions first; partitions run concurrently, and the
/// first partition found `Illegal` signals every other partition to stop
/// .
pub fn check_operations_verbose<S: Specification + Sync>(
    spec: &S,
    ops: Vec<Operation<S::Operation>>,
    timeout: Duration,
) -> (Verdict, Vec<LinearizationInfo>)
where
    S::Operation: Send,
{
    check_operations_annotated(spec, ops, timeout, Vec::new())
}

/// Like [`check_operations_verbose`], but additionally threads
/// caller-supplied `annotations` through unchanged into the
/// [`LinearizationInfo`] of every partition they apply to: an
/// annotation naming a `client_id` is attached to each partition containing
/// an operation from that client, and an unnamed one is attached to every
/// partition. The checker never reads these values.
pub fn check_operations_annotated<S: Specification + Sync>(
    spec: &S,
    ops: Vec<Operation<S::Operation>>,
    timeout: Duration,
    annotations: Vec<Annotation>,
) -> (Verdict, Vec<LinearizationInfo>)
where
    S::Operation: Send,
{
    let entries = normalize_operations(ops);
    let partitions = partition::partition_history(spec, entries);
    run_partitions(spec, partitions, timeout, annotations)
}

/// Returns whether the call/return event stream `events` has a
/// linearization consistent with real-time order that is legal against
/// `spec`.
///
/// Equivalent to normalizing `events` into operation tuples and calling
/// [`check_operations`] (the event/operation equivalence property).
pub fn check_events<S: Specification + Sync>(spec: &S, events: Vec<Event<S::Operation>>) -> bool
where
    S::Operation: Send,
{
    check_events_verbose(spec, events, Duration::ZERO).0 == Verdict::Ok
}

/// Checks the call/return event stream `events` against `spec`, returning
/// both the [`Verdict`] and evidence. See [`check_operations_verbose`].
///
/// # Panics
///
/// Panics if `events` is malformed: a `Return` with no matching `Call`, two
/// `Call`s or two `Return`s sharing an id. These are reported as fatal
/// preconditions rather than folded into the verdict, per the crate's error
/// handling design (see [`crate::linearizability::history::normalize_events`]).
pub fn check_events_verbose<S: Specification + Sync>(
    spec: &S,
    events: Vec<Event<S::Operation>>,
    timeout: Duration,
) -> (Verdict, Vec<LinearizationInfo>)
where
    S::Operation: Send,
{
    check_events_annotated(spec, events, timeout, Vec::new())
}

/// Like [`check_events_verbose`], but additionally threads caller-supplied
/// `annotations` through unchanged into the [`LinearizationInfo`] of every
/// partition they apply to. See [`check_operations_annotated`].
pub fn check_events_annotated<S: Specification + Sync>(
    spec: &S,
    events: Vec<Event<S::Operation>>,
    timeout: Duration,
    annotations: Vec<Annotation>,
) -> (Verdict, Vec<LinearizationInfo>)
where
    S::Operation: Send,
{
    let entries = normalize_events(events);
    let partitions = partition::partition_history(spec, entries);
    run_partitions(spec, partitions, timeout, annotations)
}
