//! Normalizing histories into the operation form the checker searches over.
use std::collections::HashMap;

/// An identifier for an entry (operation) within a single partition.
///
/// Entry ids are assigned densely, `0..n`, in the order operations appear
/// after normalization; they double as bit positions in the [`Bitset`](crate::bitset::Bitset)
/// used to track which operations have been linearized.
pub type EntryId = usize;

/// An identifier for the client that invoked an operation.
///
/// Purely informational: the checker never branches on it.
pub type ProcessId = usize;

/// A fully-specified operation, given with explicit call and return times.
///
/// This is the "operation tuple" form described in the crate's external
/// interface: the caller already knows both when the operation was called
/// and when it returned (and with what result), so `return_time` is always
/// known. Use [`Event`] instead when the history is only available as a
/// call/return event stream.
#[derive(Clone, Debug)]
pub struct Operation<Op> {
    pub client_id: ProcessId,
    pub op: Op,
    pub call_time: u64,
    pub return_time: u64,
}

impl<Op> Operation<Op> {
    pub fn new(client_id: ProcessId, op: Op, call_time: u64, return_time: u64) -> Self {
        assert!(
            call_time <= return_time,
            "operation's call_time ({call_time}) must not be after its return_time ({return_time})"
        );
        Self {
            client_id,
            op,
            call_time,
            return_time,
        }
    }
}

/// One half of a call/return pair in an event stream.
#[derive(Clone, Debug)]
pub enum EventKind<Op> {
    /// The invocation of an operation. Carries whatever is known about the
    /// operation at call time.
    Call(Op),
    /// The completion of an operation, carrying the operation with its
    /// result filled in. By convention this is the same variant as the
    /// matching `Call`, with the previously-unknown output now known (e.g.
    /// `Call(Read(None))` paired with `Return(Read(Some(4)))`).
    Return(Op),
}

/// A single call or return in a totally-ordered event stream.
///
/// `id` pairs a `Call` with its matching `Return`; a valid stream has at
/// most one `Call` and at most one `Return` per id, with the `Call`
/// preceding the `Return`.
#[derive(Clone, Debug)]
pub struct Event<Op> {
    pub client_id: ProcessId,
    pub id: EntryId,
    pub kind: EventKind<Op>,
}

impl<Op> Event<Op> {
    pub fn call(client_id: ProcessId, id: EntryId, op: Op) -> Self {
        Self {
            client_id,
            id,
            kind: EventKind::Call(op),
        }
    }

    pub fn ret(client_id: ProcessId, id: EntryId, op: Op) -> Self {
        Self {
            client_id,
            id,
            kind: EventKind::Return(op),
        }
    }
}

/// A normalized entry: one operation, with integer call/return positions
/// and an assigned [`EntryId`].
///
/// `return_time` is `None` only for an operation whose `Call` was never
/// matched by a `Return` (a never-returning operation) — such an
/// operation may be linearized at any point in the search, since it has no
/// fixed real-time upper bound.
#[derive(Clone, Debug)]
pub(crate) struct Entry<Op> {
    pub id: EntryId,
    pub client_id: ProcessId,
    pub op: Op,
    pub call_time: u64,
    pub return_time: Option<u64>,
}

/// Converts caller-supplied operation tuples into normalized entries.
///
/// Ids are assigned in the order given; ties in `call_time`/`return_time`
/// are broken by that same order (the "as-provided order" contract from the
/// crate's external interface).
pub(crate) fn normalize_operations<Op>(ops: Vec<Operation<Op>>) -> Vec<Entry<Op>> {
    ops.into_iter()
        .enumerate()
        .map(|(id, op)| Entry {
            id,
            client_id: op.client_id,
            op: op.op,
            call_time: op.call_time,
            return_time: Some(op.return_time),
        })
        .collect()
}

/// Matches `Call`/`Return` events by id, synthesizing integer timestamps
/// from stream position.
///
/// # Panics
///
/// Panics if two `Call` events share an id, if a `Return` event has no
/// matching `Call`, or if two `Return` events share an id: these are
/// malformed event streams, reported as fatal preconditions rather than as
/// a verdict (see the crate's error-handling design).
pub(crate) fn normalize_events<Op>(events: Vec<Event<Op>>) -> Vec<Entry<Op>> {
    // Maps a stream event id to the EntryId assigned when its Call was
    // observed, and whether that id is still awaiting a Return.
    let mut pending: HashMap<EntryId, EntryId> = HashMap::new();
    let mut entries: Vec<Entry<Op>> = Vec::new();

    for (position, event) in events.into_iter().enumerate() {
        let position = position as u64;
        match event.kind {
            EventKind::Call(op) => {
                let entry_id = entries.len();
                if pending.insert(event.id, entry_id).is_some() {
                    panic!("duplicate Call event for id {}", event.id);
                }
                entries.push(Entry {
                    id: entry_id,
                    client_id: event.client_id,
                    op,
                    call_time: position,
                    return_time: None,
                });
            }
            EventKind::Return(op) => {
                let entry_id = pending
                    .remove(&event.id)
                    .unwrap_or_else(|| panic!("Return event for id {} has no matching Call", event.id));
                let entry = &mut entries[entry_id];
                entry.op = op;
                entry.return_time = Some(position);
            }
        }
    }

    entries
}

/// The doubly-linked list of pending calls the search removes from and
/// restores to, using arena indices rather than pointers instead of a
/// pointer-based linked structure.
///
/// Nodes are arranged in call-time order (ties broken by [`EntryId`]), which
/// is the order the search considers alternatives in at each level. Removing
/// a node (`lift`) is O(1) and does not touch the node's own stored
/// `prev`/`next`, which is exactly what lets `unlift` restore it at the same
/// spot in O(1) (Lowe's lift/relift trick).
#[derive(Clone)]
pub(crate) struct PendingList {
    prev: Vec<Option<EntryId>>,
    next: Vec<Option<EntryId>>,
    head: Option<EntryId>,
}

impl PendingList {
    /// Builds the initial pending-calls list from every entry, ordered by
    /// `(call_time, id)`.
    pub(crate) fn new<Op>(entries: &[Entry<Op>]) -> Self {
        let n = entries.len();
        let mut order: Vec<EntryId> = (0..n).collect();
        order.sort_by_key(|&id| (entries[id].call_time, id));

        let mut prev = vec![None; n];
        let mut next = vec![None; n];
        for window in order.windows(2) {
            let (a, b) = (window[0], window[1]);
            next[a] = Some(b);
            prev[b] = Some(a);
        }

        Self {
            prev,
            next,
            head: order.first().copied(),
        }
    }

    /// The earliest pending call, if any remain.
    pub(crate) fn head(&self) -> Option<EntryId> {
        self.head
    }

    /// The pending call after `id`, in call-time order.
    pub(crate) fn next(&self, id: EntryId) -> Option<EntryId> {
        self.next[id]
    }

    /// Removes `id` from the list in O(1). Its own `prev`/`next` slots are
    /// left untouched so that [`PendingList::unlift`] can restore it later.
    pub(crate) fn lift(&mut self, id: EntryId) {
        match self.prev[id] {
            Some(p) => self.next[p] = self.next[id],
            None => self.head = self.next[id],
        }
        if let Some(n) = self.next[id] {
            self.prev[n] = self.prev[id];
        }
    }

    /// Reinserts `id` at the position it was last [`PendingList::lift`]ed
    /// from.
    pub(crate) fn unlift(&mut self, id: EntryId) {
        match self.prev[id] {
            Some(p) => self.next[p] = Some(id),
            None => self.head = Some(id),
        }
        if let Some(n) = self.next[id] {
            self.prev[n] = Some(id);
        }
    }
}
