//! A sequential specification of an [etcd](https://etcd.io/) key-value store.
//!
//! Parsing Jepsen-style operation logs into a [`History`](crate::History) is
//! out of scope for this crate (see the crate-level documentation); this
//! module only specifies the sequential behavior of the store, so that a
//! caller who has already parsed or synthesized a history of
//! [`EtcdOperation`]s can check it against [`EtcdSpecification`].
use crate::specifications::{structural_equal, structural_hash, Specification};

/// The status of an etcd operation, as reported by the client that issued it.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub enum EtcdStatus {
    /// The operation was invoked but has not yet completed.
    Invoke,
    /// The operation completed successfully.
    Okay,
    /// The operation failed.
    Fail,
    /// The client disconnected before learning the outcome of the operation.
    Unknown,
}

use EtcdStatus::*;

/// An etcd operation, performed on a single shared register.
///
/// In practice an etcd store exposes many such registers, each indexed by a
/// unique key; [`EtcdSpecification`] models a single key's register and
/// [`Specification::partition_key`] can be used to check a multi-key
/// history as independent per-key partitions.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub enum EtcdOperation {
    Read(EtcdStatus, Option<u32>),
    Write(EtcdStatus, u32),
    CompareAndSwap(EtcdStatus, (u32, u32)),
}

use EtcdOperation::*;

/// A sequential specification of an [etcd](https://etcd.io/) key-value store.
///
/// The specification allows for reads, writes, and compare-and-swap (CAS)
/// operations to be performed on a single shared register.
pub struct EtcdSpecification;

impl Specification for EtcdSpecification {
    type State = Option<u32>;
    type Operation = EtcdOperation;

    fn init(&self) -> Self::State {
        None
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Read(status, value) => match status {
                Okay => (value == state, *state),
                Fail => (value != state, *state),
                Invoke => panic!("cannot apply a read that has only been invoked"),
                // An etcd client that disconnected mid-read learned nothing;
                // treat it as a never-returning operation that may be
                // linearized anywhere.
                Unknown => (true, *state),
            },
            Write(status, value) => match status {
                Invoke => panic!("cannot apply a write that has only been invoked"),
                Okay => (true, Some(*value)),
                Fail => (true, *state),
                Unknown => (true, Some(*value)),
            },
            CompareAndSwap(status, (compare, swap)) => {
                let success = match state {
                    Some(value) => compare == value,
                    None => false,
                };
                match status {
                    Invoke => panic!("cannot apply a compare-and-swap that has only been invoked"),
                    Okay => (success, if success { Some(*swap) } else { *state }),
                    Fail => (!success, *state),
                    Unknown => (true, if success { Some(*swap) } else { *state }),
                }
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
