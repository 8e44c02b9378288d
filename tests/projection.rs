//! Projection Tests
//!
//! Tests for projection invariants:
//! - Inclusion keeps `_id` unless excluded; exclusion keeps everything else
//! - Absent fields are never fabricated
//! - Mixed specs are rejected when parsed

use docquery::document::Document;
use docquery::projection::Projection;
use serde_json::{json, Value as Json};

// =============================================================================
// Helper Functions
// =============================================================================

fn doc(value: Json) -> Document {
    Document::try_from(value).unwrap()
}

fn project(spec: Json, input: Json) -> Json {
    Projection::parse(&doc(spec))
        .unwrap()
        .transform(&doc(input))
        .to_json()
}

// =============================================================================
// Inclusion and Exclusion Tests
// =============================================================================

#[test]
fn test_inclusion_keeps_id() {
    assert_eq!(
        project(json!({"a": 1}), json!({"_id": 1, "a": 1, "b": 2})),
        json!({"_id": 1, "a": 1})
    );
}

#[test]
fn test_exclusion() {
    assert_eq!(
        project(json!({"b": 0}), json!({"_id": 1, "a": 1, "b": 2})),
        json!({"_id": 1, "a": 1})
    );
}

#[test]
fn test_missing_field_not_fabricated() {
    assert_eq!(project(json!({"z": 1, "_id": 0}), json!({"a": 1})), json!({}));
}

#[test]
fn test_dotted_inclusion_through_array() {
    assert_eq!(
        project(
            json!({"a.b": 1}),
            json!({"_id": 1, "a": [{"b": 1, "c": 2}, {"c": 3}], "d": 4}),
        ),
        json!({"_id": 1, "a": [{"b": 1}, {}]})
    );
}

// =============================================================================
// Slice Tests
// =============================================================================

#[test]
fn test_slice_alone_keeps_other_fields() {
    assert_eq!(
        project(json!({"arr": {"$slice": 2}}), json!({"arr": [1, 2, 3], "x": 1})),
        json!({"arr": [1, 2], "x": 1})
    );
    assert_eq!(
        project(json!({"arr": {"$slice": -2}}), json!({"arr": [1, 2, 3]})),
        json!({"arr": [2, 3]})
    );
    assert_eq!(
        project(json!({"arr": {"$slice": [1, 1]}}), json!({"arr": [1, 2, 3]})),
        json!({"arr": [2]})
    );
}

#[test]
fn test_slice_on_scalar_passes_through() {
    assert_eq!(
        project(json!({"arr": {"$slice": 1}}), json!({"arr": "scalar"})),
        json!({"arr": "scalar"})
    );
}

// =============================================================================
// Validation and Covering Tests
// =============================================================================

#[test]
fn test_mixed_spec_rejected() {
    let err = Projection::parse(&doc(json!({"a": 1, "b": 0}))).unwrap_err();
    assert_eq!(err.code(), "DQ_MIXED_PROJECTION");
}

#[test]
fn test_key_enough() {
    let flat = Projection::parse(&doc(json!({"a": 1}))).unwrap();
    assert!(flat.key_enough(&["a"]));
    assert!(!flat.key_enough(&["b"]));

    let nested = Projection::parse(&doc(json!({"a.b": 1}))).unwrap();
    assert!(!nested.key_enough(&["a"]));

    let with_id = Projection::parse(&doc(json!({"a": 1, "_id": 1}))).unwrap();
    assert!(!with_id.key_enough(&["a"]));
    assert!(with_id.key_enough(&["a", "_id"]));

    let exclusion = Projection::parse(&doc(json!({"a": 0}))).unwrap();
    assert!(!exclusion.key_enough(&["a", "b"]));
}
