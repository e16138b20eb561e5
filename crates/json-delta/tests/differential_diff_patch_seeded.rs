//! Seeded differential coverage: random document pairs pushed through
//! diff → wire codec → patch, asserting the engine's core invariants.

use json_delta::{
    apply_diff, deep_equal, delta_to_json, diff, op_from_json, op_to_json, OType, Policy,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

const KEYS: &[&str] = &["alpha", "beta", "gamma", "delta", "tags", "meta", "body"];
const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "vivamus", "portas", "fames",
];

fn gen_value(rng: &mut StdRng, depth: usize) -> Value {
    let roll = if depth == 0 { rng.gen_range(0..4) } else { rng.gen_range(0..6) };
    match roll {
        0 => json!(rng.gen_range(-100i64..100)),
        1 => json!(rng.gen_bool(0.5)),
        2 => Value::String(gen_string(rng)),
        3 => {
            if rng.gen_bool(0.1) {
                Value::Null
            } else {
                json!(rng.gen_range(-50i64..50))
            }
        }
        4 => {
            let len = rng.gen_range(0..5);
            Value::Array((0..len).map(|_| gen_value(rng, depth - 1)).collect())
        }
        _ => {
            let len = rng.gen_range(0..5);
            let mut map = Map::new();
            for _ in 0..len {
                let key = KEYS[rng.gen_range(0..KEYS.len())].to_string();
                // Null members would trip the null-addition suppression,
                // which is exercised by its own scenario test.
                let mut val = gen_value(rng, depth - 1);
                if val.is_null() {
                    val = json!(false);
                }
                map.insert(key, val);
            }
            Value::Object(map)
        }
    }
}

fn gen_string(rng: &mut StdRng) -> String {
    let len = rng.gen_range(1..6);
    let words: Vec<&str> = (0..len).map(|_| WORDS[rng.gen_range(0..WORDS.len())]).collect();
    words.join(" ")
}

/// Derive a target document by randomly editing parts of the origin.
/// Added object keys are always non-null: the engine treats null
/// additions as "not set".
fn mutate(rng: &mut StdRng, value: &Value, depth: usize) -> Value {
    if rng.gen_bool(0.2) {
        return gen_value(rng, depth);
    }
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, val) in map {
                match rng.gen_range(0..10) {
                    0 => {} // drop the key
                    1..=3 => {
                        out.insert(key.clone(), mutate(rng, val, depth.saturating_sub(1)));
                    }
                    _ => {
                        out.insert(key.clone(), val.clone());
                    }
                }
            }
            if rng.gen_bool(0.4) {
                let key = KEYS[rng.gen_range(0..KEYS.len())].to_string();
                out.insert(key, json!(rng.gen_range(0i64..10)));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            let mut out: Vec<Value> = Vec::with_capacity(items.len() + 1);
            for item in items {
                if !rng.gen_bool(0.9) {
                    continue;
                }
                if rng.gen_bool(0.3) {
                    out.push(mutate(rng, item, depth.saturating_sub(1)));
                } else {
                    out.push(item.clone());
                }
            }
            if rng.gen_bool(0.4) {
                let at = rng.gen_range(0..=out.len());
                out.insert(at, gen_value(rng, 0));
            }
            Value::Array(out)
        }
        Value::String(s) => {
            let mut edited = s.clone();
            if rng.gen_bool(0.5) {
                edited.push(' ');
                edited.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
            } else {
                edited = edited.replacen(char::from(b'a' + rng.gen_range(0..26u8)), "Q", 1);
            }
            Value::String(edited)
        }
        Value::Number(_) => json!(rng.gen_range(-100i64..100)),
        Value::Bool(b) => json!(!b),
        Value::Null => json!(0),
    }
}

/// Depth-limited policy that opts every array into positional diffing.
fn list_policy(depth: usize) -> Policy {
    let mut policy = Policy::with_otype(OType::List);
    if depth > 0 {
        policy.item = Some(Box::new(list_policy(depth - 1)));
    }
    policy
}

#[test]
fn diff_of_identical_documents_is_empty() {
    for seed in 0..40u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let doc = gen_value(&mut rng, 3);
        assert_eq!(diff(&doc, &doc, None), None, "seed {seed}");
        let copy = doc.clone();
        assert!(deep_equal(&doc, &copy));
    }
}

#[test]
fn patch_of_diff_restores_target() {
    for seed in 0..60u64 {
        let mut rng = StdRng::seed_from_u64(1000 + seed);
        let a = gen_value(&mut rng, 3);
        let b = mutate(&mut rng, &a, 3);
        match diff(&a, &b, None) {
            Some(op) => {
                let restored = apply_diff(&a, &op)
                    .unwrap_or_else(|e| panic!("seed {seed}: apply failed: {e}"));
                assert!(
                    deep_equal(&restored, &b),
                    "seed {seed}: {a} -> {b}, got {restored}"
                );
            }
            None => assert!(deep_equal(&a, &b), "seed {seed}: empty diff but {a} != {b}"),
        }
    }
}

#[test]
fn patch_of_diff_restores_target_under_list_policy() {
    for seed in 0..60u64 {
        let mut rng = StdRng::seed_from_u64(2000 + seed);
        let a = gen_value(&mut rng, 3);
        let b = mutate(&mut rng, &a, 3);
        let policy = list_policy(6);
        match diff(&a, &b, Some(&policy)) {
            Some(op) => {
                let restored = apply_diff(&a, &op)
                    .unwrap_or_else(|e| panic!("seed {seed}: apply failed: {e}"));
                assert!(
                    deep_equal(&restored, &b),
                    "seed {seed}: {a} -> {b}, got {restored}"
                );
            }
            None => assert!(deep_equal(&a, &b), "seed {seed}: empty diff but {a} != {b}"),
        }
    }
}

#[test]
fn deltas_survive_the_wire_codec() {
    for seed in 0..40u64 {
        let mut rng = StdRng::seed_from_u64(3000 + seed);
        let a = gen_value(&mut rng, 3);
        let b = mutate(&mut rng, &a, 3);
        let Some(op) = diff(&a, &b, None) else { continue };
        let encoded = op_to_json(&op);
        // The wire form is plain JSON.
        let reparsed: Value =
            serde_json::from_str(&serde_json::to_string(&encoded).unwrap()).unwrap();
        let decoded = op_from_json(&reparsed)
            .unwrap_or_else(|e| panic!("seed {seed}: decode failed: {e}"))
            .expect("known opcode");
        let restored = apply_diff(&a, &decoded)
            .unwrap_or_else(|e| panic!("seed {seed}: apply failed: {e}"));
        assert!(deep_equal(&restored, &b), "seed {seed}");
    }
}

#[test]
fn delta_json_shape_is_object_keyed() {
    let mut rng = StdRng::seed_from_u64(4242);
    let a = json!({"alpha": [1, 2, 3], "beta": "text"});
    let b = mutate(&mut rng, &a, 2);
    if let Some(json_delta::Op::Obj(delta)) = diff(&a, &b, None) {
        let wire = delta_to_json(&delta);
        assert!(wire.is_object());
        for (_, op) in wire.as_object().unwrap() {
            assert!(op.get("o").is_some(), "every op carries its opcode");
        }
    }
}
