//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a plain HashMap model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{evict_callback, Store};
use crate::config::{StoreConfig, SweepPolicy};

// == Test Configuration ==
const LONG_TTL: Duration = Duration::from_secs(3600);

fn quiet_store() -> Store<u32> {
    let config = StoreConfig::default()
        .with_sweep_interval(LONG_TTL)
        .with_sweep_policy(SweepPolicy::Fixed);
    Store::with_config(config).unwrap()
}

// == Strategies ==
/// Draws keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Insert { key: String, value: u32 },
    Lookup { key: String, extend: bool },
    Delete { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), any::<u32>())
            .prop_map(|(key, value)| CacheOp::Insert { key, value }),
        4 => (key_strategy(), any::<bool>())
            .prop_map(|(key, extend)| CacheOp::Lookup { key, extend }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any sequence of operations on long-lived entries behaves like a HashMap,
    // hits count exactly the successful lookups, and every removal through
    // delete or clear notifies exactly once.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let store = quiet_store();
        let evicted: Arc<Mutex<Vec<(String, u32)>>> = Arc::new(Mutex::new(Vec::new()));

        let mut model: HashMap<String, u32> = HashMap::new();
        let mut expected_evicted: Vec<(String, u32)> = Vec::new();
        let mut expected_hits: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Insert { key, value } => {
                    let sink = evicted.clone();
                    let callback = evict_callback(move |k: &str, v: &u32| {
                        sink.lock().push((k.to_string(), *v));
                    });
                    store.insert(key.clone(), value, LONG_TTL, Some(callback));
                    model.insert(key, value);
                }
                CacheOp::Lookup { key, extend } => {
                    let expected = model.get(&key).copied();
                    if expected.is_some() {
                        expected_hits += 1;
                    }
                    prop_assert_eq!(store.lookup(&key, extend), expected);
                }
                CacheOp::Delete { key } => {
                    let expected = model.remove(&key);
                    if let Some(value) = expected {
                        expected_evicted.push((key.clone(), value));
                    }
                    prop_assert_eq!(store.delete(&key), expected.is_some());
                }
                CacheOp::Clear => {
                    expected_evicted.extend(model.drain());
                    store.clear();
                }
            }
            prop_assert_eq!(store.count(), model.len());
        }

        prop_assert_eq!(store.hits(), expected_hits);

        let mut seen = evicted.lock().clone();
        seen.sort();
        expected_evicted.sort();
        prop_assert_eq!(seen, expected_evicted);
    }

    // Re-inserting a key replaces its value without notifying.
    #[test]
    fn prop_overwrite_semantics(key in key_strategy(), value1 in any::<u32>(), value2 in any::<u32>()) {
        let store = quiet_store();
        let evicted = Arc::new(Mutex::new(0usize));
        let sink = evicted.clone();

        store.insert(
            key.clone(),
            value1,
            LONG_TTL,
            Some(evict_callback(move |_: &str, _: &u32| *sink.lock() += 1)),
        );
        store.insert(key.clone(), value2, LONG_TTL, None);

        prop_assert_eq!(store.lookup(&key, false), Some(value2));
        prop_assert_eq!(store.count(), 1);
        prop_assert_eq!(*evicted.lock(), 0);
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After the TTL elapses without touching lookups, the entry is hidden
    // even though it is still counted until swept.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in any::<u32>()) {
        let store = quiet_store();
        store.insert(key.clone(), value, Duration::from_millis(20), None);

        prop_assert_eq!(store.lookup(&key, false), Some(value));

        std::thread::sleep(Duration::from_millis(40));

        prop_assert_eq!(store.lookup(&key, false), None);
        prop_assert_eq!(store.count(), 1);
        prop_assert_eq!(store.sweep(), 1);
        prop_assert_eq!(store.count(), 0);
    }
}
