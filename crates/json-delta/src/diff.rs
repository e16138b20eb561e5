//! Structural diff between two JSON values.

use json_delta_textdiff::{delta as text_delta, diff as text_diff, Config};
use json_delta_util::{deep_equal, ValueType};
use serde_json::{Map, Value};

use crate::lines;
use crate::op::{Delta, Op};
use crate::policy::{OType, Policy};

/// Diff two values under an optional policy. `None` means "no change".
///
/// Without a policy, the opcode is chosen by runtime type: objects diff
/// per key, strings diff at the character level, and everything else —
/// including arrays — replaces whole. Structural list diffing is opt-in
/// through a `list` or `list_dmp` policy.
pub fn diff(a: &Value, b: &Value, policy: Option<&Policy>) -> Option<Op> {
    if deep_equal(a, b) {
        return None;
    }
    if let Some(otype) = policy.and_then(|p| p.otype) {
        match otype {
            OType::Replace => return Some(Op::Rpl(b.clone())),
            OType::List => {
                if let (Value::Array(xs), Value::Array(ys)) = (a, b) {
                    return Some(Op::List(list_diff(xs, ys, policy)));
                }
                return Some(Op::Rpl(b.clone()));
            }
            OType::ListDmp => {
                if let (Value::Array(xs), Value::Array(ys)) = (a, b) {
                    return Some(Op::ListText(list_diff_dmp(xs, ys)));
                }
                return Some(Op::Rpl(b.clone()));
            }
            OType::Integer => {
                if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                    return Some(Op::NumAdd(y - x));
                }
                return Some(Op::Rpl(b.clone()));
            }
            OType::String => {
                if let (Value::String(x), Value::String(y)) = (a, b) {
                    return string_diff(x, y);
                }
                return Some(Op::Rpl(b.clone()));
            }
        }
    }
    if ValueType::of(a) != ValueType::of(b) {
        return Some(Op::Rpl(b.clone()));
    }
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => Some(Op::Obj(object_diff(x, y, policy))),
        (Value::String(x), Value::String(y)) => string_diff(x, y),
        _ => Some(Op::Rpl(b.clone())),
    }
}

fn string_diff(a: &str, b: &str) -> Option<Op> {
    let mut diffs = text_diff::diff(a, b);
    text_diff::cleanup_efficiency(&mut diffs, Config::default().edit_cost);
    if !diffs.iter().any(|(tag, _)| *tag != text_diff::DiffTag::Eql) {
        return None;
    }
    Some(Op::Text(text_delta::to_delta(&diffs)))
}

/// Per-key diff of two objects. Keys missing from `b` delete; keys new in
/// `b` insert, unless the new value is null — null additions are treated
/// as "not set" and suppressed.
pub fn object_diff(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    policy: Option<&Policy>,
) -> Delta {
    let mut out = Delta::new();
    for (key, a_val) in a {
        match b.get(key) {
            Some(b_val) => {
                let sub = policy.and_then(|p| p.attribute(key));
                if let Some(op) = diff(a_val, b_val, sub) {
                    out.insert(key.clone(), op);
                }
            }
            None => {
                out.insert(key.clone(), Op::Del);
            }
        }
    }
    for (key, b_val) in b {
        if !a.contains_key(key) && !b_val.is_null() {
            out.insert(key.clone(), Op::Ins(b_val.clone()));
        }
    }
    out
}

/// Positional diff of two arrays: trim the common prefix and suffix, then
/// walk the remainder. Keys are indices into the origin array.
pub fn list_diff(a: &[Value], b: &[Value], policy: Option<&Policy>) -> Delta {
    let max_common = a.len().min(b.len());
    let mut pfx = 0usize;
    while pfx < max_common && deep_equal(&a[pfx], &b[pfx]) {
        pfx += 1;
    }
    let mut sfx = 0usize;
    let rest = max_common - pfx;
    while sfx < rest && deep_equal(&a[a.len() - 1 - sfx], &b[b.len() - 1 - sfx]) {
        sfx += 1;
    }

    let ta = &a[pfx..a.len() - sfx];
    let tb = &b[pfx..b.len() - sfx];
    let item_policy = policy.and_then(|p| p.item());

    let mut out = Delta::new();
    for i in 0..ta.len().max(tb.len()) {
        let key = (pfx + i).to_string();
        if i < ta.len() && i < tb.len() {
            if let Some(op) = diff(&ta[i], &tb[i], item_policy) {
                out.insert(key, op);
            }
        } else if i < ta.len() {
            out.insert(key, Op::Del);
        } else {
            out.insert(key, Op::Ins(tb[i].clone()));
        }
    }
    out
}

/// Line-framed text diff of two arrays.
pub fn list_diff_dmp(a: &[Value], b: &[Value]) -> String {
    let a_text = lines::serialize_list(a);
    let b_text = lines::serialize_list(b);
    let mut diffs = text_diff::diff_line_mode(&a_text, &b_text);
    text_diff::cleanup_efficiency(&mut diffs, Config::default().edit_cost);
    text_delta::to_delta(&diffs)
}
