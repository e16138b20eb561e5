//! Operational transform over concurrent deltas sharing a common base.
//!
//! `transform_*_diff(da, db, s, ..)` rewrites `da` so that it can be
//! applied after `db` has landed on their shared base `s`, preserving A's
//! intent: `apply(apply(s, db), da')` converges with `apply(apply(s, da),
//! db')` for non-conflicting edits.

use json_delta_textdiff::{delta as text_delta, diff as text_diff, patch as text_patch, Config};
use json_delta_util::deep_equal;
use serde_json::Value;

use crate::diff::diff;
use crate::error::DeltaError;
use crate::lines;
use crate::op::{parse_index, Delta, Op};
use crate::patch::apply_diff;
use crate::policy::Policy;

static NULL: Value = Value::Null;

fn value_at<'a>(s: &'a Value, key: &str) -> &'a Value {
    match s {
        Value::Object(map) => map.get(key).unwrap_or(&NULL),
        Value::Array(list) => key
            .parse::<usize>()
            .ok()
            .and_then(|i| list.get(i))
            .unwrap_or(&NULL),
        _ => &NULL,
    }
}

/// Rewrite an object delta `da` so it applies after `db` on the shared
/// base `s`. Keys present only in `da` pass through untouched.
pub fn transform_object_diff(
    da: &Delta,
    db: &Delta,
    s: &Value,
    policy: Option<&Policy>,
) -> Result<Delta, DeltaError> {
    let mut out = da.clone();
    for (key, a_op) in da {
        let Some(b_op) = db.get(key) else { continue };
        let sub = policy.and_then(|p| p.attribute(key));
        match transform_op_pair(a_op, b_op, value_at(s, key), sub)? {
            Some(op) => {
                out.insert(key.clone(), op);
            }
            None => {
                out.remove(key);
            }
        }
    }
    Ok(out)
}

/// Resolve one concurrent operation pair rooted at `base`. `None` drops
/// A's operation (B already covered it); `Some` is A's rewritten intent.
fn transform_op_pair(
    a_op: &Op,
    b_op: &Op,
    base: &Value,
    policy: Option<&Policy>,
) -> Result<Option<Op>, DeltaError> {
    match (a_op, b_op) {
        (Op::Ins(av), Op::Ins(bv)) => {
            if deep_equal(av, bv) {
                // Both sides already agree.
                Ok(None)
            } else {
                // Rebase A's insert as an edit from B's inserted value.
                Ok(diff(bv, av, policy))
            }
        }
        (Op::Del, Op::Del) => Ok(None),
        (
            Op::Rpl(_) | Op::NumAdd(_) | Op::Obj(_) | Op::List(_) | Op::Text(_) | Op::ListText(_),
            Op::Del,
        ) => {
            // A edited a value B deleted: reinstate with A's final value.
            Ok(Some(Op::Ins(apply_diff(base, a_op)?)))
        }
        (Op::Obj(ad), Op::Obj(bd)) => Ok(Some(Op::Obj(transform_object_diff(
            ad, bd, base, policy,
        )?))),
        (Op::List(ad), Op::List(bd)) => Ok(Some(Op::List(transform_list_diff(
            ad, bd, base, policy,
        )?))),
        (Op::ListText(ad), Op::ListText(bd)) => {
            let list = base.as_array().ok_or(DeltaError::NotAList)?;
            let rebased = transform_list_diff_dmp(ad, bd, list)?;
            Ok(Some(Op::ListText(rebased)))
        }
        (Op::Text(ad), Op::Text(bd)) => transform_text_pair(ad, bd, base),
        _ => Ok(Some(a_op.clone())),
    }
}

/// Rebase A's text edits onto the text B produced. Both deltas are framed
/// against the shared base string.
fn transform_text_pair(
    a_delta: &str,
    b_delta: &str,
    base: &Value,
) -> Result<Option<Op>, DeltaError> {
    let text = base.as_str().ok_or(DeltaError::NotAString)?;
    let b_text = patch_onto(text, b_delta, text)?;
    let ab_text = patch_onto(text, a_delta, &b_text)?;
    if ab_text == b_text {
        // A's edits are subsumed by B's.
        return Ok(None);
    }
    let mut diffs = text_diff::diff(&b_text, &ab_text);
    text_diff::cleanup_efficiency(&mut diffs, Config::default().edit_cost);
    Ok(Some(Op::Text(text_delta::to_delta(&diffs))))
}

/// Build patches for a delta framed against `base` and fuzzily apply them
/// onto `target`.
fn patch_onto(base: &str, delta: &str, target: &str) -> Result<String, DeltaError> {
    let cfg = Config::default();
    let diffs = text_delta::from_delta(base, delta)?;
    let patches = text_patch::make(&cfg, base, &diffs);
    let (out, _matched) = text_patch::apply(&cfg, &patches, target);
    Ok(out)
}

/// Rewrite a list delta `da` so it applies after `db`: indices shift right
/// past B's insertions and left past B's deletions; colliding indices
/// resolve through the operation pair table.
pub fn transform_list_diff(
    da: &Delta,
    db: &Delta,
    s: &Value,
    policy: Option<&Policy>,
) -> Result<Delta, DeltaError> {
    let mut b_inserts: Vec<usize> = Vec::new();
    let mut b_deletes: Vec<usize> = Vec::new();
    for (key, op) in db {
        let index = parse_index(key)?;
        match op {
            Op::Ins(_) => b_inserts.push(index),
            Op::Del => b_deletes.push(index),
            _ => {}
        }
    }
    b_inserts.sort_unstable();
    b_deletes.sort_unstable();

    let mut entries: Vec<(usize, &Op)> = Vec::with_capacity(da.len());
    for (key, op) in da {
        entries.push((parse_index(key)?, op));
    }
    entries.sort_unstable_by_key(|(index, _)| *index);

    let item_policy = policy.and_then(|p| p.item());
    let mut out = Delta::new();
    for (index, a_op) in entries {
        let shift_r = b_inserts.iter().filter(|&&p| p < index).count() as isize;
        let shift_l = b_deletes.iter().filter(|&&p| p < index).count() as isize;
        let adjusted = (index as isize + shift_r - shift_l).max(0) as usize;
        let key = adjusted.to_string();
        match db.get(&key) {
            Some(b_op) => {
                if let Some(op) = transform_op_pair(a_op, b_op, value_at(s, &key), item_policy)? {
                    out.insert(key, op);
                }
            }
            None => {
                out.insert(key, a_op.clone());
            }
        }
    }
    Ok(out)
}

/// Rewrite a line-framed list delta `da` against `db`. Both deltas are
/// framed over the newline serialization of `s`; the result expresses A's
/// residual edit on top of B's text, or an empty delta when subsumed.
pub fn transform_list_diff_dmp(da: &str, db: &str, s: &[Value]) -> Result<String, DeltaError> {
    let text = lines::serialize_list(s);
    let b_text = patch_onto(&text, db, &text)?;
    let ab_text = patch_onto(&text, da, &b_text)?;
    if ab_text == b_text {
        return Ok(String::new());
    }
    let mut diffs = text_diff::diff(&b_text, &ab_text);
    text_diff::cleanup_efficiency(&mut diffs, Config::default().edit_cost);
    Ok(text_delta::to_delta(&diffs))
}
