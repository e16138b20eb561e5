//! End-to-end scenarios over the public diff/patch surface, including the
//! wire codec.

use json_delta::{
    apply_diff, apply_object_diff, deep_equal, delta_from_json, diff, op_from_json, op_to_json,
    OType, Op, Policy,
};
use serde_json::{json, Value};

fn diff_op(a: &Value, b: &Value, policy: Option<&Policy>) -> Op {
    diff(a, b, policy).expect("diff should be non-empty")
}

#[test]
fn integer_policy_scenario() {
    let a = json!({"n": 5});
    let b = json!({"n": 6});
    let policy = Policy::from_json(&json!({"attributes": {"n": {"otype": "integer"}}})).unwrap();

    let op = diff_op(&a, &b, Some(&policy));
    assert_eq!(
        op_to_json(&op),
        json!({"o": "O", "v": {"n": {"o": "I", "v": 1.0}}})
    );
    assert_eq!(apply_diff(&a, &op).unwrap(), b);
}

#[test]
fn arrays_replace_whole_by_default() {
    let a = json!([1, 2, 3]);
    let b = json!([1, 2, 4]);
    let op = diff_op(&a, &b, None);
    assert_eq!(op_to_json(&op), json!({"o": "r", "v": [1, 2, 4]}));
    assert_eq!(apply_diff(&a, &op).unwrap(), b);
}

#[test]
fn list_policy_replaces_at_index() {
    let a = json!([1, 2, 3]);
    let b = json!([1, 2, 4]);
    let policy = Policy::with_otype(OType::List);
    let op = diff_op(&a, &b, Some(&policy));
    assert_eq!(
        op_to_json(&op),
        json!({"o": "L", "v": {"2": {"o": "r", "v": 4}}})
    );
    assert_eq!(apply_diff(&a, &op).unwrap(), b);
}

#[test]
fn list_policy_deletes_after_affix_trim() {
    let a = json!([1, 3, 2, 3, 4]);
    let b = json!([1, 2, 3, 4]);
    let policy = Policy::with_otype(OType::List);
    let op = diff_op(&a, &b, Some(&policy));
    assert_eq!(op_to_json(&op), json!({"o": "L", "v": {"1": {"o": "-"}}}));
    assert_eq!(apply_diff(&a, &op).unwrap(), b);
}

#[test]
fn string_fields_produce_text_deltas() {
    let a = json!({"name": "Ted"});
    let b = json!({"name": "Red"});
    let op = diff_op(&a, &b, None);
    assert_eq!(
        op_to_json(&op),
        json!({"o": "O", "v": {"name": {"o": "d", "v": "-1\t+R\t=2"}}})
    );
    assert_eq!(apply_diff(&a, &op).unwrap(), b);
}

#[test]
fn cross_type_bool_number_equality() {
    assert!(deep_equal(&json!(true), &json!(1)));
    assert!(deep_equal(&json!(false), &json!(0)));
    assert!(!deep_equal(&json!(true), &json!(2)));
    assert_eq!(diff(&json!(true), &json!(1), None), None);
}

#[test]
fn null_additions_are_suppressed_on_the_wire() {
    let a = json!({"kept": 1});
    let b = json!({"kept": 1, "ghost": null});
    let op = diff(&a, &b, None).expect("objects differ structurally");
    assert_eq!(op_to_json(&op), json!({"o": "O", "v": {}}));
    // Applying the empty object diff is a no-op copy.
    assert_eq!(apply_diff(&a, &op).unwrap(), a);
}

#[test]
fn unknown_opcodes_are_noops_at_their_position() {
    let s = json!({"a": 1, "b": 2});
    let delta = delta_from_json(&json!({
        "a": {"o": "r", "v": 10},
        "b": {"o": "teleport", "v": 99},
    }))
    .unwrap();
    let out = apply_object_diff(s.as_object().unwrap(), &delta).unwrap();
    assert_eq!(Value::Object(out), json!({"a": 10, "b": 2}));
}

#[test]
fn wire_roundtrip_of_a_composite_delta() {
    let a = json!({
        "title": "draft",
        "count": 4,
        "tags": ["x", "y", "z"],
    });
    let b = json!({
        "title": "draft v2",
        "count": 9,
        "tags": ["x", "q", "z"],
    });
    let policy = Policy::from_json(&json!({
        "attributes": {
            "count": {"otype": "integer"},
            "tags": {"otype": "list"},
        }
    }))
    .unwrap();
    let op = diff_op(&a, &b, Some(&policy));

    // Through the wire and back.
    let encoded = op_to_json(&op);
    let decoded = op_from_json(&encoded).unwrap().expect("known opcode");
    assert_eq!(apply_diff(&a, &decoded).unwrap(), b);
}

#[test]
fn patch_restores_target_exactly_for_deep_documents() {
    let a = json!({
        "id": "doc-1",
        "meta": {"rev": 3, "author": "kim", "labels": ["draft"]},
        "body": "It was a dark and stormy night.",
        "refs": [{"to": "doc-2"}, {"to": "doc-3"}],
    });
    let b = json!({
        "id": "doc-1",
        "meta": {"rev": 4, "author": "kim"},
        "body": "It was a bright and quiet morning.",
        "refs": [{"to": "doc-2"}, {"to": "doc-4"}],
    });
    let op = diff_op(&a, &b, None);
    assert_eq!(apply_diff(&a, &op).unwrap(), b);
    assert_eq!(diff(&b, &b, None), None);
}
