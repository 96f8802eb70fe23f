//! A sequential specification of a [register](https://en.wikipedia.org/wiki/Shared_register).
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::{structural_equal, structural_hash, Specification};

/// An operation for a [register](https://en.wikipedia.org/wiki/Shared_register).
#[derive(Debug, Clone)]
pub enum RegisterOperation<T> {
    /// Read a value of type `T` from the register.
    ///
    /// If the return value of the operation is not-yet-known (the client
    /// never observed a response), this can be represented as `Read(None)`,
    /// in which case the value is treated as the "unknown output" sentinel
    /// for a never-returning operation.
    Read(Option<T>),
    /// Write a value of type `T` to the register.
    Write(T),
}

use RegisterOperation::*;

/// A sequential specification of a [register](https://en.wikipedia.org/wiki/Shared_register).
pub struct RegisterSpecification<T> {
    data_type: PhantomData<T>,
}

impl<T> RegisterSpecification<T> {
    pub fn new() -> Self {
        Self {
            data_type: PhantomData,
        }
    }
}

impl<T> Default for RegisterSpecification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Debug + Default + Eq + Hash> Specification for RegisterSpecification<T> {
    type State = T;
    type Operation = RegisterOperation<T>;

    fn init(&self) -> Self::State {
        T::default()
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            // A read whose value is unknown (a never-returning operation) is
            // always accepted: it may be linearized at any point.
            Read(None) => (true, state.clone()),
            Read(Some(value)) => (value == state, state.clone()),
            Write(value) => (true, value.clone()),
        }
    }

    fn equal(&self, a: &Self::State, b: &Self::State) -> bool {
        structural_equal(a, b)
    }

    fn state_hash(&self, state: &Self::State) -> u64 {
        structural_hash(state)
    }
}
