//! Concrete linearizability scenarios, plus the cross-cutting properties the
//! checker is expected to satisfy for any model/history pair.
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use todc_linearize::specifications::nondeterministic::{
    NondeterministicAdapter, NondeterministicSpecification,
};
use todc_linearize::specifications::register::{RegisterOperation, RegisterSpecification};
use todc_linearize::specifications::{structural_equal, structural_hash};
use todc_linearize::{
    check_events, check_events_verbose, check_operations, check_operations_annotated,
    check_operations_verbose, Annotation, Event, Operation, Specification, Verdict,
};

use RegisterOperation::{Read, Write};

fn register() -> RegisterSpecification<u32> {
    RegisterSpecification::new()
}

/// A register history where a linearization respecting real-time order exists.
#[test]
fn linearizable_register() {
    let ops = vec![
        Operation::new(0, Write(100), 0, 100),
        Operation::new(1, Read(Some(100)), 25, 75),
        Operation::new(2, Read(Some(0)), 30, 60),
    ];
    assert!(check_operations(&register(), ops));
}

/// A register history with no valid linearization: one reader's return
/// precedes another's call, forcing it first in any linearization, but that
/// reader observes the post-write value while the later one observes the
/// pre-write value.
#[test]
fn non_linearizable_register() {
    let ops = vec![
        Operation::new(0, Write(200), 0, 100),
        Operation::new(1, Read(Some(200)), 10, 30),
        Operation::new(2, Read(Some(0)), 40, 90),
    ];
    assert!(!check_operations(&register(), ops));
}

/// Zero-duration operations are permitted, and two zero-duration reads at
/// the same instant can both precede the write in the chosen order.
#[test]
fn zero_duration_operations() {
    let ops = vec![
        Operation::new(0, Write(100), 0, 100),
        Operation::new(1, Read(Some(100)), 25, 75),
        Operation::new(2, Read(Some(0)), 30, 30),
        Operation::new(3, Read(Some(0)), 30, 30),
    ];
    assert!(check_operations(&register(), ops));
}

/// The event-stream form of the linearizable-register history above.
#[test]
fn event_form_equivalent_to_operation_form() {
    let events = vec![
        Event::call(0, 0, Write(100)),
        Event::call(1, 1, Read(None)),
        Event::call(2, 2, Read(None)),
        Event::ret(2, 2, Read(Some(0))),
        Event::ret(1, 1, Read(Some(100))),
        Event::ret(0, 0, Write(100)),
    ];
    assert!(check_events(&register(), events));
}

#[derive(Clone, Debug)]
enum KeyedOp {
    Put(char, u32),
    Get(char, Option<u32>),
}

struct KeyedRegisterSpec;

impl Specification for KeyedRegisterSpec {
    type State = HashMap<char, u32>;
    type Operation = KeyedOp;

    fn init(&self) -> Self::State {
        HashMap::new()
    }

    fn apply(&self, op: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match op {
            KeyedOp::Put(key, value) => {
                let mut next = state.clone();
                next.insert(*key, *value);
                (true, next)
            }
            KeyedOp::Get(_, None) => (true, state.clone()),
            KeyedOp::Get(key, Some(value)) => (state.get(key) == Some(value), state.clone()),
        }
    }

    fn equal(&self, a: &Self::State, b: &Self::State) -> bool {
        structural_equal(&sorted(a), &sorted(b))
    }

    fn state_hash(&self, state: &Self::State) -> u64 {
        structural_hash(&sorted(state))
    }

    fn partition_key(&self, op: &Self::Operation) -> Option<u64> {
        let key = match op {
            KeyedOp::Put(k, _) | KeyedOp::Get(k, _) => *k,
        };
        Some(key as u64)
    }
}

fn sorted(state: &HashMap<char, u32>) -> Vec<(char, u32)> {
    let mut pairs: Vec<_> = state.iter().map(|(&k, &v)| (k, v)).collect();
    pairs.sort();
    pairs
}

/// A keyed KV history where "x" is non-linearizable and "y" is
/// linearizable; the overall verdict is `Illegal` and evidence should
/// localize the failure to the "x" partition.
#[test]
fn keyed_kv_localizes_failure_to_one_partition() {
    let ops = vec![
        // "x": non-linearizable, same shape as the register scenario above.
        Operation::new(0, KeyedOp::Put('x', 200), 0, 100),
        Operation::new(1, KeyedOp::Get('x', Some(200)), 10, 30),
        Operation::new(2, KeyedOp::Get('x', Some(0)), 40, 90),
        // "y": linearizable, same shape as the register scenario above.
        Operation::new(3, KeyedOp::Put('y', 100), 0, 100),
        Operation::new(4, KeyedOp::Get('y', Some(100)), 25, 75),
        Operation::new(5, KeyedOp::Get('y', Some(0)), 30, 60),
    ];

    let (verdict, infos) = check_operations_verbose(&KeyedRegisterSpec, ops, Default::default());
    assert_eq!(verdict, Verdict::Illegal);
    assert_eq!(infos.len(), 2);

    let mut found_failing_partition = false;
    for info in &infos {
        let n = info.entries.len();
        let best = info.partial_linearizations.last().map(|p| p.len()).unwrap_or(0);
        if best < n {
            found_failing_partition = true;
            assert_eq!(n, 3, "the failing partition should be the 3-operation 'x' partition");
        } else {
            assert_eq!(best, n);
        }
    }
    assert!(found_failing_partition, "evidence should localize a failing partition");
}

#[derive(Clone, Debug)]
enum PutAnyOp {
    Put(Vec<u32>),
    GetAny(u32),
    GetAll(BTreeSet<u32>),
}

struct PutAnyRegister;

impl NondeterministicSpecification for PutAnyRegister {
    type State = BTreeSet<u32>;
    type Operation = PutAnyOp;

    fn init(&self) -> Self::State {
        BTreeSet::new()
    }

    fn step_nd(&self, op: &Self::Operation, state: &Self::State) -> Vec<Self::State> {
        match op {
            PutAnyOp::Put(candidates) => candidates
                .iter()
                .map(|&v| {
                    let mut next = state.clone();
                    next.insert(v);
                    next
                })
                .collect(),
            PutAnyOp::GetAny(v) => {
                if state.contains(v) {
                    vec![state.clone()]
                } else {
                    vec![]
                }
            }
            PutAnyOp::GetAll(expected) => {
                if state == expected {
                    vec![state.clone()]
                } else {
                    vec![]
                }
            }
        }
    }
}

/// A nondeterministic "put-any"/"get-any" register where a `get_all`
/// reports a visible set that disagrees with what a concurrent `get_any`
/// observed: whichever value the nondeterministic put committed to, one of
/// the two readers must be wrong.
#[test]
fn nondeterministic_register_disagreement_is_illegal() {
    let adapter = NondeterministicAdapter::new(PutAnyRegister);
    let ops = vec![
        // Sequential setup: {1}, then {1, 2}.
        Operation::new(0, PutAnyOp::Put(vec![1]), 0, 1),
        Operation::new(1, PutAnyOp::Put(vec![2]), 2, 3),
        // Concurrent window: the put nondeterministically commits to 3 or 4.
        Operation::new(2, PutAnyOp::Put(vec![3, 4]), 10, 100),
        Operation::new(3, PutAnyOp::GetAny(1), 20, 30),
        Operation::new(4, PutAnyOp::GetAny(4), 40, 50),
        Operation::new(5, PutAnyOp::GetAll(BTreeSet::from([1, 2, 3])), 60, 70),
    ];
    assert!(!check_operations(&adapter, ops));
}

/// Wraps a specification so every `apply` call sleeps a fixed duration,
/// making the wall-clock outcome of a timeout deterministic regardless of
/// host speed.
struct SlowSpec<S> {
    inner: S,
    per_step: Duration,
}

impl<S: Specification> Specification for SlowSpec<S> {
    type State = S::State;
    type Operation = S::Operation;

    fn init(&self) -> Self::State {
        self.inner.init()
    }

    fn apply(&self, op: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        std::thread::sleep(self.per_step);
        self.inner.apply(op, state)
    }

    fn equal(&self, a: &Self::State, b: &Self::State) -> bool {
        self.inner.equal(a, b)
    }

    fn state_hash(&self, state: &Self::State) -> u64 {
        self.inner.state_hash(state)
    }
}

/// A history with no valid linearization — an unsatisfiable read overlapping
/// several interchangeable writes — forces the search to exhaust its
/// backtracking tree rather than stopping at the first candidate, so a
/// slowed-down `apply` reliably blows through a short deadline: the checker
/// should report `Unknown` rather than whatever it takes to reach `Illegal`.
#[test]
fn slow_adversarial_history_times_out_to_unknown() {
    let spec = SlowSpec {
        inner: register(),
        per_step: Duration::from_millis(2),
    };

    let num_writes = 8;
    let mut ops: Vec<Operation<RegisterOperation<u32>>> = (0..num_writes)
        .map(|i| Operation::new(i, Write(i as u32), 0, 1000))
        .collect();
    // Never written, so this read can never be satisfied: every overlapping
    // ordering of the writes must be tried before the search could give up.
    ops.push(Operation::new(num_writes, Read(Some(999)), 0, 1000));

    let (verdict, _) = check_operations_verbose(&spec, ops, Duration::from_millis(5));
    assert_eq!(verdict, Verdict::Unknown);
}

// --- Universal invariants ---

/// A single-operation history is `Ok` iff the operation is legal against
/// `init`.
#[test]
fn invariant_single_operation_matches_model_legality() {
    let spec = register();
    let legal_ops = vec![Operation::new(0, Write(7), 0, 1)];
    assert!(check_operations(&spec, legal_ops));

    let illegal_ops = vec![Operation::new(0, Read(Some(7)), 0, 1)];
    assert!(!check_operations(&spec, illegal_ops));
}

/// A fully sequential (non-overlapping) history is `Ok` iff the
/// as-given order is legal against the model.
#[test]
fn invariant_sequential_history_matches_sequential_legality() {
    let spec = register();
    let legal_ops = vec![
        Operation::new(0, Write(1), 0, 1),
        Operation::new(1, Read(Some(1)), 2, 3),
        Operation::new(2, Write(2), 4, 5),
        Operation::new(3, Read(Some(2)), 6, 7),
    ];
    assert!(check_operations(&spec, legal_ops));

    let illegal_ops = vec![
        Operation::new(0, Write(1), 0, 1),
        Operation::new(1, Read(Some(99)), 2, 3),
    ];
    assert!(!check_operations(&spec, illegal_ops));
}

/// Idempotence: checking the same history twice gives the same answer.
#[test]
fn invariant_idempotence() {
    let spec = register();
    let ops = || {
        vec![
            Operation::new(0, Write(1), 0, 100),
            Operation::new(1, Read(Some(1)), 25, 75),
            Operation::new(2, Read(Some(0)), 30, 60),
        ]
    };
    assert_eq!(check_operations(&spec, ops()), check_operations(&spec, ops()));
}

/// Partition independence: the whole history is `Ok` iff every partition
/// is individually `Ok`.
#[test]
fn invariant_partition_independence() {
    let x_only = vec![
        Operation::new(0, KeyedOp::Put('x', 200), 0, 100),
        Operation::new(1, KeyedOp::Get('x', Some(200)), 10, 30),
        Operation::new(2, KeyedOp::Get('x', Some(0)), 40, 90),
    ];
    assert!(!check_operations(&KeyedRegisterSpec, x_only));

    let y_only = vec![
        Operation::new(3, KeyedOp::Put('y', 100), 0, 100),
        Operation::new(4, KeyedOp::Get('y', Some(100)), 25, 75),
        Operation::new(5, KeyedOp::Get('y', Some(0)), 30, 60),
    ];
    assert!(check_operations(&KeyedRegisterSpec, y_only));

    // Combined, since one partition is illegal, the whole history is too.
    let combined = vec![
        Operation::new(0, KeyedOp::Put('x', 200), 0, 100),
        Operation::new(1, KeyedOp::Get('x', Some(200)), 10, 30),
        Operation::new(2, KeyedOp::Get('x', Some(0)), 40, 90),
        Operation::new(3, KeyedOp::Put('y', 100), 0, 100),
        Operation::new(4, KeyedOp::Get('y', Some(100)), 25, 75),
        Operation::new(5, KeyedOp::Get('y', Some(0)), 30, 60),
    ];
    assert!(!check_operations(&KeyedRegisterSpec, combined));
}

/// Event/operation equivalence: checking an event stream gives the same
/// answer as checking its normalized operation-tuple form.
#[test]
fn invariant_event_operation_equivalence() {
    let spec = register();
    assert_eq!(
        check_operations(
            &spec,
            vec![
                Operation::new(0, Write(1), 0, 2),
                Operation::new(1, Read(Some(1)), 3, 5),
            ]
        ),
        check_events(
            &spec,
            vec![
                Event::call(0, 0, Write(1)),
                Event::ret(0, 0, Write(1)),
                Event::call(1, 1, Read(None)),
                Event::ret(1, 1, Read(Some(1))),
            ]
        )
    );
}

/// Never-returning equivalence: appending a Return with an "unknown"
/// output for an unmatched Call leaves the verdict unchanged.
#[test]
fn invariant_never_returning_equivalence() {
    let spec = register();
    let without_return = vec![
        Event::call(0, 0, Write(1)),
        Event::ret(0, 0, Write(1)),
        Event::call(1, 1, Read(None)),
    ];
    let with_unknown_return = vec![
        Event::call(0, 0, Write(1)),
        Event::ret(0, 0, Write(1)),
        Event::call(1, 1, Read(None)),
        Event::ret(1, 1, Read(None)),
    ];
    assert_eq!(
        check_events(&spec, without_return),
        check_events(&spec, with_unknown_return)
    );
}

/// Caller-supplied annotations are passed through unchanged: a
/// client-tagged annotation lands only on the partition containing that
/// client's operations, and an untagged one lands on every partition.
#[test]
fn annotations_are_threaded_through_to_the_right_partitions() {
    let ops = vec![
        Operation::new(0, KeyedOp::Put('x', 200), 0, 100),
        Operation::new(1, KeyedOp::Get('x', Some(200)), 10, 30),
        Operation::new(3, KeyedOp::Put('y', 100), 0, 100),
        Operation::new(4, KeyedOp::Get('y', Some(100)), 25, 75),
    ];
    let annotations = vec![
        Annotation {
            timestamp: 10,
            tag: "client 1 note".into(),
            client_id: Some(1),
        },
        Annotation {
            timestamp: 0,
            tag: "applies everywhere".into(),
            client_id: None,
        },
    ];

    let (_, infos) = check_operations_annotated(
        &KeyedRegisterSpec,
        ops,
        Default::default(),
        annotations,
    );
    assert_eq!(infos.len(), 2);
    for info in &infos {
        assert!(info.annotations.iter().any(|a| a.tag == "applies everywhere"));
    }
    let partitions_with_client_note = infos
        .iter()
        .filter(|info| info.annotations.iter().any(|a| a.tag == "client 1 note"))
        .count();
    assert_eq!(
        partitions_with_client_note, 1,
        "a client-tagged annotation should land on exactly the partition containing that client"
    );
}

/// Determinism: repeated verbose checks of the same history produce the
/// same verdict and the same evidence lengths, independent of scheduling.
#[test]
fn invariant_determinism_across_repeated_runs() {
    let spec = register();
    let ops = || {
        vec![
            Operation::new(0, Write(1), 0, 100),
            Operation::new(1, Read(Some(1)), 25, 75),
            Operation::new(2, Read(Some(0)), 30, 60),
        ]
    };
    let (v1, info1) = check_operations_verbose(&spec, ops(), Default::default());
    let (v2, info2) = check_operations_verbose(&spec, ops(), Default::default());
    assert_eq!(v1, v2);
    assert_eq!(
        info1[0].partial_linearizations.last().map(|p| p.len()),
        info2[0].partial_linearizations.last().map(|p| p.len())
    );
}
