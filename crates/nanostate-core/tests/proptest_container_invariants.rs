//! Property-based invariant tests for containers and keyed containers.
//!
//! **Container:**
//! 1. Version equals the number of value-changing dispatches.
//! 2. A dispatch of the current value notifies nobody.
//! 3. A value-changing dispatch notifies every registered handle exactly
//!    once, with the new value.
//! 4. Under `ClearOnDispatch` the registry is empty after a value-changing
//!    dispatch; under `Retain` it is unchanged.
//! 5. A deregistered handle is never notified by later dispatches.
//!
//! **ValuesContainer:**
//! 6. Lenient `entry` on a missing key creates it with the initial value,
//!    and the key persists.
//! 7. Strict `entry` fails exactly for missing keys.
//! 8. `dispatch` never creates keys.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use nanostate_core::{Container, Handle, LookupError, RegistryPolicy, ValuesConfig, ValuesContainer};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Dispatch(u8),
    Register(usize),
    Deregister(usize),
}

const SLOTS: usize = 4;

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(Op::Dispatch),
        (0..SLOTS).prop_map(Op::Register),
        (0..SLOTS).prop_map(Op::Deregister),
    ]
}

fn policy_strategy() -> impl Strategy<Value = RegistryPolicy> {
    prop_oneof![
        Just(RegistryPolicy::ClearOnDispatch),
        Just(RegistryPolicy::Retain),
    ]
}

type Log = Rc<RefCell<Vec<(usize, u8)>>>;

fn register(container: &Container<u8>, handles: &[Handle], slot: usize, log: &Log) {
    let log = Rc::clone(log);
    container.register(
        handles[slot],
        Rc::new(move |v: &u8| log.borrow_mut().push((slot, *v))),
    );
}

// ── Container invariants ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn registry_matches_model(
        policy in policy_strategy(),
        ops in proptest::collection::vec(op_strategy(), 1..64),
    ) {
        let container = Container::with_policy(0u8, policy);
        let handles: Vec<Handle> = (0..SLOTS).map(|_| Handle::mint()).collect();
        let log: Log = Rc::new(RefCell::new(Vec::new()));

        let mut model_value = 0u8;
        let mut model_version = 0u64;
        let mut model_registered: BTreeSet<usize> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Register(slot) => {
                    register(&container, &handles, slot, &log);
                    model_registered.insert(slot);
                }
                Op::Deregister(slot) => {
                    let removed = container.deregister(handles[slot]);
                    prop_assert_eq!(removed, model_registered.remove(&slot));
                }
                Op::Dispatch(value) => {
                    log.borrow_mut().clear();
                    container.dispatch(value);
                    let mut seen: Vec<(usize, u8)> = log.borrow().clone();
                    seen.sort_unstable();

                    if value == model_value {
                        // 2. no-op
                        prop_assert!(seen.is_empty());
                    } else {
                        model_value = value;
                        model_version += 1;
                        // 3. exactly once each, with the new value
                        let expected: Vec<(usize, u8)> =
                            model_registered.iter().map(|&s| (s, value)).collect();
                        prop_assert_eq!(seen, expected);
                        // 4. policy
                        if policy == RegistryPolicy::ClearOnDispatch {
                            model_registered.clear();
                        }
                    }
                }
            }
            // 1. version
            prop_assert_eq!(container.version(), model_version);
            prop_assert_eq!(container.get(), model_value);
            prop_assert_eq!(container.subscriber_count(), model_registered.len());
        }
    }

    #[test]
    fn deregistered_handles_stay_silent(
        values in proptest::collection::vec(1u8..=255, 1..16),
    ) {
        // 5.
        let container = Container::with_policy(0u8, RegistryPolicy::Retain);
        let handles: Vec<Handle> = (0..2).map(|_| Handle::mint()).collect();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        register(&container, &handles, 0, &log);
        register(&container, &handles, 1, &log);
        container.deregister(handles[1]);

        for v in values {
            container.dispatch(v);
        }
        prop_assert!(log.borrow().iter().all(|&(slot, _)| slot == 0));
    }
}

// ── ValuesContainer invariants ────────────────────────────────────────────

proptest! {
    #[test]
    fn lenient_entry_creates_and_persists(
        initial in proptest::collection::btree_map(0u8..16, any::<i32>(), 0..8),
        probes in proptest::collection::vec((0u8..16, any::<i32>()), 1..32),
    ) {
        // 6.
        let values = ValuesContainer::from_pairs(initial.clone(), ValuesConfig::new());
        let mut model: BTreeMap<u8, i32> = initial;

        for (key, init) in probes {
            let got = values.entry(key, || init).expect("lenient").get();
            let expected = *model.entry(key).or_insert(init);
            prop_assert_eq!(got, expected);
            prop_assert!(values.contains_key(&key));
        }
        prop_assert_eq!(values.len(), model.len());
    }

    #[test]
    fn strict_entry_fails_only_for_missing(
        initial in proptest::collection::btree_map(0u8..16, any::<i32>(), 0..8),
        probes in proptest::collection::vec(0u8..16, 1..32),
    ) {
        // 7.
        let values = ValuesContainer::from_pairs(initial.clone(), ValuesConfig::strict());
        for key in probes {
            match values.entry(key, || 0) {
                Ok(c) => prop_assert_eq!(Some(c.get()), initial.get(&key).copied()),
                Err(err) => {
                    prop_assert!(!initial.contains_key(&key));
                    prop_assert_eq!(err, LookupError::missing(&key));
                }
            }
        }
        prop_assert_eq!(values.len(), initial.len());
    }

    #[test]
    fn dispatch_never_creates_keys(
        strict in any::<bool>(),
        keys in proptest::collection::vec(0u8..16, 1..32),
    ) {
        // 8.
        let values: ValuesContainer<u8, i32> =
            ValuesContainer::new(ValuesConfig::new().with_strict(strict));
        for key in keys {
            prop_assert!(values.dispatch(&key, 1).is_err());
        }
        prop_assert!(values.is_empty());
    }
}
