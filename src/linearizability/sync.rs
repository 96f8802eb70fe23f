//! Aliases the atomics and `Arc` the worker pool builds on, swapping in
//! loom's model-checked equivalents under the `loom` feature so the
//! cancellation protocol in [`crate::linearizability::pool`] can be
//! exhaustively verified rather than merely tested (see the `loom_tests`
//! module at the bottom of `pool.rs`).
#[cfg(feature = "loom")]
pub(crate) use loom::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
