//! Property-based tests for flattening, expansion and merging

use super::*;
use crate::error::Error;
use proptest::prelude::*;
use serde_yaml::{Mapping, Value};

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1e6f64..1e6).prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
        prop::collection::vec(any::<i32>(), 0..3).prop_map(Value::from),
    ]
}

fn to_mapping(entries: std::collections::BTreeMap<String, Value>) -> Mapping {
    entries.into_iter().map(|(k, v)| (Value::from(k), v)).collect()
}

fn arb_tree() -> impl Strategy<Value = Mapping> {
    let value = arb_leaf().prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
            .prop_map(|m| Value::Mapping(to_mapping(m)))
    });
    prop::collection::btree_map("[a-z]{1,4}", value, 0..5).prop_map(to_mapping)
}

fn is_prefix_free(keys: &[String]) -> bool {
    keys.iter().all(|a| keys.iter().all(|b| a == b || !b.starts_with(&format!("{a}."))))
}

fn arb_prefix_free_flat() -> impl Strategy<Value = FlatMap> {
    prop::collection::btree_map("[a-c](\\.[a-c]){0,2}", arb_leaf(), 1..8)
        .prop_filter("keys must be prefix free", |m| {
            is_prefix_free(&m.keys().cloned().collect::<Vec<_>>())
        })
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_round_trip_through_flat_form(tree in arb_tree()) {
        let cfg = HierarchicalConfig::from_mapping(&tree).unwrap();
        let reduced = HierarchicalConfig::from_mapping(&cfg.to_mapping()).unwrap();
        let back = HierarchicalConfig::expand(&reduced.flatten()).unwrap();
        prop_assert_eq!(back, cfg);
    }

    #[test]
    fn prop_flatten_inverts_expand(flat in arb_prefix_free_flat()) {
        let cfg = HierarchicalConfig::expand(&flat).unwrap();
        prop_assert_eq!(cfg.flatten(), flat);
    }

    #[test]
    fn prop_flat_keys_have_no_empty_segments(tree in arb_tree()) {
        let cfg = HierarchicalConfig::from_mapping(&tree).unwrap();
        for key in cfg.flatten().keys() {
            prop_assert!(split_path(key).is_ok());
        }
    }

    #[test]
    fn prop_merge_is_right_biased(
        dst in prop::collection::btree_map("[a-e]", arb_leaf(), 0..5),
        src in prop::collection::btree_map("[a-e]", arb_leaf(), 0..5),
    ) {
        let out = merged(to_mapping(dst.clone()), to_mapping(src.clone()));
        for (k, v) in &src {
            prop_assert_eq!(out.get(k.as_str()), Some(v));
        }
        for (k, v) in &dst {
            if !src.contains_key(k) {
                prop_assert_eq!(out.get(k.as_str()), Some(v));
            }
        }
    }

    #[test]
    fn prop_prefix_conflict_rejected(
        base in "[a-c]",
        child in "[a-c]",
        leaf_first in any::<bool>(),
    ) {
        let nested = format!("{base}.{child}");
        let flat: FlatMap = if leaf_first {
            [(base.clone(), 1), (nested, 2)].into_iter().collect()
        } else {
            [(nested, 2), (base.clone(), 1)].into_iter().collect()
        };
        let is_conflict = matches!(
            HierarchicalConfig::expand(&flat),
            Err(Error::KeyConflict { .. })
        );
        prop_assert!(is_conflict);
    }
}
