//! Property tests for the configuration deep merge.

use proptest::prelude::*;
use serde_yaml_ng::{Mapping, Value};

use jinja_watch::config::{deep_merge, merged};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
        proptest::collection::vec(any::<i32>().prop_map(|i| Value::from(i64::from(i))), 0..4)
            .prop_map(Value::Sequence),
    ]
}

/// Mappings over a tiny key space so base and overlay collide often
fn mapping_of(inner: impl Strategy<Value = Value>) -> impl Strategy<Value = Mapping> {
    proptest::collection::btree_map("[a-e]", inner, 0..5)
        .prop_map(|m| m.into_iter().map(|(k, v)| (Value::from(k), v)).collect())
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| mapping_of(inner).prop_map(Value::Mapping))
}

fn mapping() -> impl Strategy<Value = Mapping> {
    mapping_of(value())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Overlay values win, except that two mappings merge key by key.
    #[test]
    fn property_overlay_wins_except_nested_mappings(base in mapping(), overlay in mapping()) {
        let result = merged(&base, &overlay);

        for (key, value) in &overlay {
            let got = result.get(key);
            prop_assert!(got.is_some(), "overlay key {key:?} missing from result");
            match (base.get(key), value) {
                (Some(Value::Mapping(b)), Value::Mapping(o)) => {
                    prop_assert_eq!(got, Some(&Value::Mapping(merged(b, o))));
                }
                _ => prop_assert_eq!(got, Some(value)),
            }
        }
    }

    /// PROPERTY: Keys only the base has survive untouched, and nothing else appears.
    #[test]
    fn property_base_only_keys_survive(base in mapping(), overlay in mapping()) {
        let result = merged(&base, &overlay);

        for (key, value) in &base {
            if !overlay.contains_key(key) {
                prop_assert_eq!(result.get(key), Some(value));
            }
        }
        for key in result.keys() {
            prop_assert!(base.contains_key(key) || overlay.contains_key(key));
        }
    }

    /// PROPERTY: Sequences are replaced, never concatenated.
    #[test]
    fn property_sequences_replace(
        base_items in proptest::collection::vec(any::<i64>(), 0..5),
        overlay_items in proptest::collection::vec(any::<i64>(), 0..5),
    ) {
        let to_seq = |items: &[i64]| Value::Sequence(items.iter().map(|i| Value::from(*i)).collect());
        let mut base = Mapping::new();
        base.insert(Value::from("list"), to_seq(&base_items));
        let mut overlay = Mapping::new();
        overlay.insert(Value::from("list"), to_seq(&overlay_items));

        deep_merge(&mut base, &overlay);
        prop_assert_eq!(base.get("list"), Some(&to_seq(&overlay_items)));
    }

    /// PROPERTY: Applying the same overlay twice changes nothing more.
    #[test]
    fn property_merge_is_idempotent(base in mapping(), overlay in mapping()) {
        let once = merged(&base, &overlay);
        let twice = merged(&once, &overlay);
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: Empty operands are identities.
    #[test]
    fn property_empty_is_identity(m in mapping()) {
        prop_assert_eq!(merged(&m, &Mapping::new()), m.clone());
        prop_assert_eq!(merged(&Mapping::new(), &m), m);
    }
}
