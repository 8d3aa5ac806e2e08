//! Property-based tests for the object engine.
//!
//! Uses proptest to verify the convergence and boundedness guarantees
//! over generated payloads: semantically equal inputs canonicalize
//! identically, factor sets ignore collection order, and coherence stays
//! in `[0, 1]`.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use uor_object::prelude::*;

/// A small generated scalar.
fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

/// A generated flat object payload: field names to scalars or small
/// string arrays.
fn payload() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        prop_oneof![
            scalar(),
            prop::collection::vec("[a-z]{0,6}".prop_map(Value::String), 0..4)
                .prop_map(Value::Array),
        ],
        0..6,
    )
    .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    /// Key insertion order never changes the canonical string.
    #[test]
    fn prop_canonical_form_ignores_key_order(entries in payload()) {
        let policy = CanonicalPolicy::default();
        let forward = Value::Object(entries.clone());
        let mut reversed = Map::new();
        for (key, value) in entries.iter().rev() {
            reversed.insert(key.clone(), value.clone());
        }
        prop_assert_eq!(
            canonical_string(&forward, &policy),
            canonical_string(&Value::Object(reversed), &policy)
        );
    }

    /// Null and empty-string fields never change the canonical string.
    #[test]
    fn prop_empty_fields_are_semantically_absent(entries in payload(), noise in "[a-z]{1,6}") {
        let policy = CanonicalPolicy::default();
        let bare = Value::Object(entries.clone());
        let mut padded = entries;
        padded.insert(format!("{noise}_null"), Value::Null);
        padded.insert(format!("{noise}_blank"), Value::String(String::new()));
        prop_assert_eq!(
            canonical_string(&bare, &policy),
            canonical_string(&Value::Object(padded), &policy)
        );
    }

    /// Unordered-collection permutation never changes the canonical
    /// string or the factor-id set.
    #[test]
    fn prop_collection_order_is_irrelevant(mut tags in prop::collection::vec("[a-z]{1,6}", 1..6)) {
        let borrowed: Vec<&str> = tags.iter().map(String::as_str).collect();
        let forward = Concept::new("c-1", "Graph", "x").with_tags(&borrowed);

        tags.reverse();
        let borrowed: Vec<&str> = tags.iter().map(String::as_str).collect();
        let reversed = Concept::new("c-1", "Graph", "x").with_tags(&borrowed);

        prop_assert_eq!(
            forward.compute_canonical_representation().content,
            reversed.compute_canonical_representation().content
        );
        prop_assert_eq!(
            forward.compute_prime_decomposition().sorted_factor_ids(),
            reversed.compute_prime_decomposition().sorted_factor_ids()
        );
    }

    /// Coherence is bounded for arbitrary generic payloads.
    #[test]
    fn prop_coherence_is_bounded(entries in payload()) {
        let object = DataObject::new("x-1", TypeTag::new("test"), Value::Object(entries));
        let value = object.measure_coherence().value;
        prop_assert!((0.0..=1.0).contains(&value));
    }

    /// Decomposition is never empty and always leads with the core
    /// identity factor.
    #[test]
    fn prop_decomposition_is_nonempty(entries in payload()) {
        let object = DataObject::new("x-1", TypeTag::new("test"), Value::Object(entries));
        let decomposition = object.compute_prime_decomposition();
        prop_assert!(!decomposition.is_empty());
        prop_assert_eq!(decomposition.prime_factors[0].id.as_str(), "test:x-1");
    }

    /// Frame transforms never change canonical content or factor sets.
    #[test]
    fn prop_frame_invariance(entries in payload()) {
        let object = DataObject::new("x-1", TypeTag::new("test"), Value::Object(entries));
        let frame = ObserverFrame::new("frame:p", Perspective::Intersubjective).shared();
        let transformed = object.transform_to_frame(frame);
        prop_assert_eq!(
            object.compute_canonical_representation().content,
            transformed.compute_canonical_representation().content
        );
        prop_assert_eq!(
            object.compute_prime_decomposition().sorted_factor_ids(),
            transformed.compute_prime_decomposition().sorted_factor_ids()
        );
    }
}

#[test]
fn structurally_equal_objects_converge() {
    // The concrete scenario: {a:1,b:2} and {b:2,a:1} under the same id.
    let first = DataObject::new("obj-1", TypeTag::new("test"), json!({ "a": 1, "b": 2 }));
    let second = DataObject::new("obj-1", TypeTag::new("test"), json!({ "b": 2, "a": 1 }));
    assert_eq!(
        first.compute_canonical_representation().content,
        second.compute_canonical_representation().content
    );
    assert_eq!(
        first.compute_prime_decomposition().sorted_factor_ids(),
        second.compute_prime_decomposition().sorted_factor_ids()
    );
}

#[test]
fn distinct_ids_differ_only_in_the_core_factor() {
    let first = DataObject::new("obj-1", TypeTag::new("test"), json!({ "a": 1, "b": 2 }));
    let second = DataObject::new("obj-2", TypeTag::new("test"), json!({ "a": 1, "b": 2 }));

    let first_ids = first.compute_prime_decomposition().sorted_factor_ids();
    let second_ids = second.compute_prime_decomposition().sorted_factor_ids();

    let only_first: Vec<_> = first_ids
        .iter()
        .filter(|id| !second_ids.contains(id))
        .collect();
    let only_second: Vec<_> = second_ids
        .iter()
        .filter(|id| !first_ids.contains(id))
        .collect();
    assert_eq!(only_first, ["test:obj-1"]);
    assert_eq!(only_second, ["test:obj-2"]);
}
