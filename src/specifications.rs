//! Specifying the behavior of shared objects.
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

pub mod etcd;
pub mod nondeterministic;
pub mod register;
pub mod snapshot;

/// A partition key, used to split a history into independently-checkable
/// sub-histories.
///
/// See [`Specification::partition_key`].
pub type PartitionKey = u64;

/// Structural equality, for specifications whose `State` implements
/// `PartialEq` and whose notion of equivalence is simply "are these the
/// same value" — the common case ([`RegisterSpecification`](crate::specifications::register::RegisterSpecification),
/// [`EtcdSpecification`](crate::specifications::etcd::EtcdSpecification),
/// [`SnapshotSpecification`](crate::specifications::snapshot::SnapshotSpecification)
/// all use this for [`Specification::equal`]).
pub fn structural_equal<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// Structural hashing, for specifications whose `State` implements `Hash`
/// and whose notion of equivalence is structural equality (see
/// [`structural_equal`]). Consistent with it: `structural_equal(a, b)`
/// implies `structural_hash(a) == structural_hash(b)`.
pub fn structural_hash<T: Hash>(state: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

/// A (sequential) specification of an object.
///
/// This trait defines how operations performed on the object affect its
/// state, and is the sole interface the checker uses to reason about
/// legality. State and operation values are otherwise opaque to the
/// checker.
///
/// # Examples
///
/// Consider the following specification for a register that stores a single
/// `u32` value. Initially, the register contains the value `0`.
///
/// ```
/// use todc_linearize::Specification;
/// use todc_linearize::specifications::{structural_equal, structural_hash};
///
/// #[derive(Copy, Clone, Debug)]
/// enum RegisterOp {
///     Read(u32),
///     Write(u32),
/// }
///
/// use RegisterOp::{Read, Write};
///
/// struct RegisterSpec;
///
/// impl Specification for RegisterSpec {
///     type State = u32;
///     type Operation = RegisterOp;
///
///     fn init(&self) -> Self::State {
///         0
///     }
///
///     fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
///         match operation {
///             Read(value) => (value == state, *state),
///             Write(value) => (true, *value),
///         }
///     }
///
///     fn equal(&self, a: &Self::State, b: &Self::State) -> bool {
///         structural_equal(a, b)
///     }
///
///     fn state_hash(&self, state: &Self::State) -> u64 {
///         structural_hash(state)
///     }
/// }
/// ```
///
/// A `Write` operation is always valid, as is a `Read` operation that
/// returns the value of the most-recent write.
///
/// ```
/// # use todc_linearize::Specification;
/// # use todc_linearize::specifications::{structural_equal, structural_hash};
/// # #[derive(Copy, Clone, Debug)]
/// # enum RegisterOp { Read(u32), Write(u32) }
/// # use RegisterOp::{Read, Write};
/// # struct RegisterSpec;
/// # impl Specification for RegisterSpec {
/// #     type State = u32;
/// #     type Operation = RegisterOp;
/// #     fn init(&self) -> Self::State { 0 }
/// #     fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
/// #         match operation {
/// #             Read(value) => (value == state, *state),
/// #             Write(value) => (true, *value),
/// #         }
/// #     }
/// #     fn equal(&self, a: &Self::State, b: &Self::State) -> bool { structural_equal(a, b) }
/// #     fn state_hash(&self, state: &Self::State) -> u64 { structural_hash(state) }
/// # }
/// let spec = RegisterSpec {};
/// let (is_valid, new_state) = spec.apply(&Write(1), &spec.init());
/// assert!(is_valid);
/// assert_eq!(new_state, 1);
/// ```
pub trait Specification {
    /// The state of the object between operations.
    ///
    /// Unlike the simplest formulations of this trait, `State` is not
    /// required to implement `Eq`/`Hash` directly — see [`Specification::equal`]
    /// and [`Specification::state_hash`], which every specification must
    /// implement explicitly (structurally, via [`structural_equal`] and
    /// [`structural_hash`], in the common case; custom-canonicalized, as in
    /// [`NondeterministicAdapter`](crate::specifications::nondeterministic::NondeterministicAdapter),
    /// when the natural notion of state equality is not the derived one).
    type State: Clone + Debug;
    /// The operations that can be performed on the object.
    type Operation: Clone + Debug;

    /// Returns an initial state for the object.
    fn init(&self) -> Self::State;

    /// Returns whether applying an operation to a given state is valid, and
    /// the new state that occurs after the operation has been applied.
    ///
    /// If the operation is not valid, the returned state is ignored by the
    /// checker, but by convention implementations return the unmodified
    /// input state.
    fn apply(&self, op: &Self::Operation, state: &Self::State) -> (bool, Self::State);

    /// Returns whether two states should be treated as equivalent for the
    /// purposes of cache deduplication.
    ///
    /// Must be an equivalence relation consistent with [`Specification::apply`]:
    /// if `equal(a, b)`, then `apply(op, a)` and `apply(op, b)` must agree on
    /// validity and produce states that are themselves `equal`.
    ///
    /// Required rather than defaulted: a default gated by `Self::State:
    /// PartialEq` would only be usable from code that already knows that
    /// bound holds, which generic callers like the checker and the cache
    /// don't. Specifications with naturally `PartialEq` state (the common
    /// case) implement this as `a == b`; see [`structural_equal`] for a
    /// one-line helper.
    fn equal(&self, a: &Self::State, b: &Self::State) -> bool;

    /// Returns a hash of a state, consistent with [`Specification::equal`]:
    /// `equal(a, b)` implies `state_hash(a) == state_hash(b)`.
    ///
    /// Required for the same reason as [`Specification::equal`]; see
    /// [`structural_hash`] for a one-line helper when `State: Hash`.
    fn state_hash(&self, state: &Self::State) -> u64;

    /// Returns a partition key for an operation's input, if the object can
    /// be partitioned.
    ///
    /// When every operation in a history yields a key, the history can be
    /// checked as independent partitions, one per key (see
    /// [`crate::linearizability::partition::partition_history`]). The
    /// specification author is responsible for ensuring that operations in
    /// distinct partitions actually commute in every reachable state — the
    /// checker cannot verify this.
    fn partition_key(&self, _op: &Self::Operation) -> Option<PartitionKey> {
        None
    }

    /// A human-readable description of an operation, for diagnostics only.
    fn describe_op(&self, op: &Self::Operation) -> String {
        format!("{op:?}")
    }

    /// A human-readable description of a state, for diagnostics only.
    fn describe_state(&self, state: &Self::State) -> String {
        format!("{state:?}")
    }
}
