//! Property-Based Tests for Cache Module
//!
//! Checks the set-once contract of the local backend against a simple
//! first-writer-wins model.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{Cache, LocalCache, LocalStore};

// == Test Configuration ==
const TEST_TTL: u64 = 300;

// == Strategies ==
/// Generates trace-like keys from a small pool so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(|s| s.to_string())
}

/// Generates epoch-like hex values
fn value_strategy() -> impl Strategy<Value = String> {
    any::<u32>().prop_map(|v| format!("{:08x}", v))
}

#[derive(Debug, Clone)]
enum CacheOp {
    GetOrSet { key: String, value: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::GetOrSet { key, value }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of get-or-set and delete calls, each get-or-set returns
    // the value of the first call since the key was last deleted.
    #[test]
    fn prop_first_writer_wins(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = LocalStore::new(TEST_TTL);
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::GetOrSet { key, value } => {
                    let expected = model.entry(key.clone()).or_insert_with(|| value.clone()).clone();
                    let got = store.get_or_set(&key, value);
                    prop_assert_eq!(got, expected);
                }
                CacheOp::Delete { key } => {
                    model.remove(&key);
                    store.delete(&key);
                }
            }
        }

        prop_assert_eq!(store.len(), model.len());
    }

    // Delete followed by get-or-set always installs the new candidate.
    #[test]
    fn prop_delete_then_get_or_set_installs(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy()
    ) {
        let mut store = LocalStore::new(TEST_TTL);

        store.get_or_set(&key, first);
        store.delete(&key);

        prop_assert_eq!(store.get_or_set(&key, second.clone()), second);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Every caller racing on one key through the async backend sees one value,
    // and that value is one of the candidates.
    #[test]
    fn prop_concurrent_callers_agree(candidates in prop::collection::vec(value_strategy(), 1..16)) {
        let results = tokio_test::block_on(async {
            let cache = std::sync::Arc::new(LocalCache::new("local://?sweep_interval=0", 60).unwrap());
            cache.start().await.unwrap();

            let calls = candidates.iter().map(|candidate| {
                let cache = cache.clone();
                async move { cache.get_or_set("trace", candidate).await.unwrap() }
            });
            let results = futures::future::join_all(calls).await;

            cache.stop().await.unwrap();
            results
        });

        prop_assert!(results.iter().all(|v| *v == results[0]));
        prop_assert_eq!(&results[0], &candidates[0]);
    }
}
