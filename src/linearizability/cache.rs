//! Memoizing visited (linearized-set, model-state) pairs.
use std::collections::HashMap;

use crate::bitset::Bitset;
use crate::specifications::Specification;

/// Memoizes `(bitset, state)` pairs already explored by the search, so that
/// equivalent states reached via different partial linearizations are only
/// explored once.
///
/// Keyed by `(bitset, state_hash)`, with a small bucket of state
/// representatives per key to resolve hash collisions via
/// [`Specification::equal`]: a plain `HashSet<(Bitset, State)>` isn't enough
/// when `State` doesn't implement `Eq` natively.
pub(crate) struct LinearizationCache<S: Specification> {
    buckets: HashMap<(Bitset, u64), Vec<S::State>>,
}

impl<S: Specification> LinearizationCache<S> {
    pub(crate) fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Records `(linearized, state)` if it hasn't been seen before.
    ///
    /// Returns `true` if this is a new equivalence class (the search should
    /// proceed), or `false` if an equal state was already cached for this
    /// bitset (the search should prune).
    pub(crate) fn insert(&mut self, spec: &S, linearized: Bitset, state: &S::State) -> bool {
        let key = (linearized, spec.state_hash(state));
        let bucket = self.buckets.entry(key).or_default();
        if bucket.iter().any(|cached| spec.equal(cached, state)) {
            false
        } else {
            bucket.push(state.clone());
            true
        }
    }
}
