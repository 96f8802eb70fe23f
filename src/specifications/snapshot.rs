//! A sequential specification of a [snapshot object](https://en.wikipedia.org/wiki/Shared_snapshot_objects).
use core::array::from_fn;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::{structural_equal, structural_hash, Specification};

use SnapshotOperation::{Scan, Update};

/// A process identifier.
pub type ProcessId = usize;

/// An operation for a snapshot object.
#[derive(Debug, Clone)]
pub enum SnapshotOperation<T, const N: usize> {
    /// Scan the object and return a view containing the values in each
    /// component.
    ///
    /// If the return value of a scan is not-yet-known, this can be
    /// represented as `Scan(pid, None)`.
    Scan(ProcessId, Option<[T; N]>),
    /// Update the component of the object belonging to this process.
    Update(ProcessId, T),
}

/// A specification of an `N`-process [snapshot object](https://en.wikipedia.org/wiki/Shared_snapshot_objects).
///
/// Each component of the snapshot contains a value of type `T`.
pub struct SnapshotSpecification<T: Clone + Debug + Default + Eq + Hash, const N: usize> {
    data_type: PhantomData<T>,
}

impl<T: Clone + Debug + Default + Eq + Hash, const N: usize> SnapshotSpecification<T, N> {
    // Required so that the phantom field data_type can be instantiated.
    pub fn new() -> Self {
        Self {
            data_type: PhantomData,
        }
    }
}

impl<T: Clone + Debug + Default + Eq + Hash, const N: usize> Default
    for SnapshotSpecification<T, N>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Debug + Default + Eq + Hash, const N: usize> Specification
    for SnapshotSpecification<T, N>
{
    type State = [T; N];
    type Operation = SnapshotOperation<T, N>;

    fn init(&self) -> Self::State {
        from_fn(|_| T::default())
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Scan(_, result) => match result {
                Some(view) => (view == state, state.clone()),
                // A never-returning scan may be linearized anywhere.
                None => (true, state.clone()),
            },
            Update(i, value) => {
                let mut new_state = state.clone();
                new_state[*i] = value.clone();
                (true, new_state)
            }
        }
    }

    fn equal(&self, a: &Self::State, b: &Self::State) -> bool {
        structural_equal(a, b)
    }

    fn state_hash(&self, state: &Self::State) -> u64 {
        structural_hash(state)
    }
}
