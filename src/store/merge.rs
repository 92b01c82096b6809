use serde_json::{Map, Value};

/// Deep-merge `delta` into `target`.
///
/// For each key of `delta`: when both the delta value and the current target
/// value are objects, the merge recurses into them key by key. Anything else
/// (primitives, `null`, arrays, or a target key that is missing or not an
/// object) replaces the target value wholesale. Arrays are never merged
/// element-wise.
///
/// # Examples
///
/// ```
/// use ministore::store::merge_into;
/// use serde_json::json;
///
/// let mut state = json!({ "user": { "id": 1, "name": "A" } });
/// let delta = json!({ "user": { "name": "B" } });
///
/// merge_into(
///     state.as_object_mut().unwrap(),
///     delta.as_object().unwrap().clone(),
/// );
/// assert_eq!(state, json!({ "user": { "id": 1, "name": "B" } }));
/// ```
pub fn merge_into(target: &mut Map<String, Value>, delta: Map<String, Value>) {
    for (key, value) in delta {
        match value {
            Value::Object(partial) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => merge_into(existing, partial),
                _ => {
                    target.insert(key, Value::Object(partial));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn merge(target: Value, delta: Value) -> Value {
        let mut target = target;
        let Value::Object(delta) = delta else {
            panic!("delta must be an object");
        };
        merge_into(target.as_object_mut().expect("target object"), delta);
        target
    }

    #[rstest]
    #[case::nested_key(
        json!({ "user": { "id": 1, "name": "A" } }),
        json!({ "user": { "name": "B" } }),
        json!({ "user": { "id": 1, "name": "B" } }),
    )]
    #[case::null_overwrites_object(
        json!({ "user": { "id": 1 } }),
        json!({ "user": null }),
        json!({ "user": null }),
    )]
    #[case::object_into_null(
        json!({ "user": null }),
        json!({ "user": { "id": 2 } }),
        json!({ "user": { "id": 2 } }),
    )]
    #[case::array_is_atomic(
        json!({ "tags": ["a", "b", "c"] }),
        json!({ "tags": ["z"] }),
        json!({ "tags": ["z"] }),
    )]
    #[case::object_replaces_array(
        json!({ "tags": ["a"] }),
        json!({ "tags": { "first": "a" } }),
        json!({ "tags": { "first": "a" } }),
    )]
    #[case::absent_key_is_added(
        json!({ "user": { "id": 1 } }),
        json!({ "user": { "address": { "city": "Oslo" } } }),
        json!({ "user": { "id": 1, "address": { "city": "Oslo" } } }),
    )]
    #[case::deep_recursion(
        json!({ "a": { "b": { "c": 1, "d": 2 }, "e": 3 } }),
        json!({ "a": { "b": { "d": 20 } } }),
        json!({ "a": { "b": { "c": 1, "d": 20 }, "e": 3 } }),
    )]
    #[case::empty_delta(
        json!({ "count": 1 }),
        json!({}),
        json!({ "count": 1 }),
    )]
    fn merge_cases(#[case] target: Value, #[case] delta: Value, #[case] expected: Value) {
        assert_eq!(merge(target, delta), expected);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-d]", arb_json(), 0..5)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn merge_into_empty_yields_delta(delta in arb_object()) {
            prop_assert_eq!(merge(json!({}), delta.clone()), delta);
        }

        #[test]
        fn merge_is_idempotent(target in arb_object(), delta in arb_object()) {
            let once = merge(target, delta.clone());
            let twice = merge(once.clone(), delta);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn keys_outside_delta_are_untouched(target in arb_object(), delta in arb_object()) {
            let merged = merge(target.clone(), delta.clone());
            let delta = delta.as_object().unwrap();
            for (key, value) in target.as_object().unwrap() {
                if !delta.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }

        #[test]
        fn non_object_delta_values_overwrite(target in arb_object(), delta in arb_object()) {
            let merged = merge(target, delta.clone());
            for (key, value) in delta.as_object().unwrap() {
                if !value.is_object() {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }
    }
}
