//! Lifting a nondeterministic sequential specification into a deterministic
//! [`Specification`].
use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use crate::specifications::Specification;

/// A nondeterministic sequential specification: applying an operation to a
/// state yields a *set* of possible next states, rather than a single one.
///
/// This is the natural way to specify objects like a "put-any"/"get-any"
/// register, where a `put` may race with another and either value is an
/// acceptable subsequent read.
pub trait NondeterministicSpecification {
    type State: Clone + Debug + Ord + Hash;
    type Operation: Clone + Debug;

    /// Returns an initial state for the object.
    fn init(&self) -> Self::State;

    /// Returns every state that may legally result from applying `op` to
    /// `state`. An empty result means the operation is illegal in `state`.
    fn step_nd(&self, op: &Self::Operation, state: &Self::State) -> Vec<Self::State>;

    /// A human-readable description of an operation, for diagnostics only.
    fn describe_op(&self, op: &Self::Operation) -> String {
        format!("{op:?}")
    }
}

/// Adapts a [`NondeterministicSpecification`] into a deterministic
/// [`Specification`] whose state is the set of states the underlying model
/// could concretely be in.
///
/// `apply` is legal iff the union of `step_nd` over every element of the
/// current set is non-empty; the new state is that union. Two adapted
/// states are equal iff they contain the same set of underlying states, and
/// are hashed as the canonical (sorted) sequence of the underlying states'
/// hashes, per the set's `BTreeSet` ordering.
///
/// This is the designated approach for specifications like "put-any"/
/// "get-any" registers: model `put` as moving to a state that additionally
/// contains the written value, and `get` as valid for any value present in
/// any element of the set.
pub struct NondeterministicAdapter<M> {
    model: M,
}

impl<M> NondeterministicAdapter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: NondeterministicSpecification> Specification for NondeterministicAdapter<M> {
    type State = BTreeSet<M::State>;
    type Operation = M::Operation;

    fn init(&self) -> Self::State {
        let mut states = BTreeSet::new();
        states.insert(self.model.init());
        states
    }

    fn apply(&self, op: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        let mut next = BTreeSet::new();
        for element in state {
            next.extend(self.model.step_nd(op, element));
        }
        let is_valid = !next.is_empty();
        (is_valid, if is_valid { next } else { state.clone() })
    }

    fn equal(&self, a: &Self::State, b: &Self::State) -> bool {
        a == b
    }

    fn state_hash(&self, state: &Self::State) -> u64 {
        const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = FNV_OFFSET_BASIS;
        // `BTreeSet` iterates in sorted order, so this is stable across
        // equal sets regardless of insertion order.
        for element in state {
            let mut hasher = DefaultHasher::new();
            element.hash(&mut hasher);
            hash ^= hasher.finish();
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    fn describe_op(&self, op: &Self::Operation) -> String {
        self.model.describe_op(op)
    }
}
