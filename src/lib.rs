//! Checking whether a concurrent history of operations is
//! [linearizable](https://en.wikipedia.org/wiki/Linearizability) with respect to a
//! user-supplied sequential specification.
//!
//! See [`linearizability`] for the checker itself, and [`specifications`] for
//! the [`Specification`] trait that describes an object's sequential
//! behavior, plus a few ready-made specifications (a register, an etcd-style
//! key-value store, a snapshot object, and a nondeterministic-specification
//! adapter).
mod bitset;
pub mod linearizability;
pub mod specifications;

pub use linearizability::{
    check_events, check_events_annotated, check_events_verbose, check_operations,
    check_operations_annotated, check_operations_verbose, Annotation, EntryId, EntryTimes, Event,
    EventKind, LinearizationInfo, Operation, PartialLinearization, ProcessId, Verdict,
};
pub use specifications::Specification;
