//! Non-destructive application of deltas to JSON values.

use json_delta_textdiff::{delta as text_delta, patch as text_patch, Config};
use serde_json::{Map, Value};

use crate::error::DeltaError;
use crate::lines;
use crate::op::{parse_index, Delta, Op};

/// Apply a single operation to a value, producing the edited value.
///
/// Type mismatches between the value and the opcode surface as errors —
/// they indicate a corrupt or mis-targeted delta.
pub fn apply_diff(a: &Value, op: &Op) -> Result<Value, DeltaError> {
    match op {
        Op::Ins(v) | Op::Rpl(v) => Ok(v.clone()),
        Op::Del => Ok(Value::Null),
        Op::NumAdd(d) => {
            let base = a.as_f64().ok_or(DeltaError::NotANumber)?;
            Ok(number_value(base + d))
        }
        Op::Obj(diffs) => {
            let map = a.as_object().ok_or(DeltaError::NotAnObject)?;
            Ok(Value::Object(apply_object_diff(map, diffs)?))
        }
        Op::List(diffs) => {
            let list = a.as_array().ok_or(DeltaError::NotAList)?;
            Ok(Value::Array(apply_list_diff(list, diffs)?))
        }
        Op::ListText(delta) => {
            let list = a.as_array().ok_or(DeltaError::NotAList)?;
            Ok(Value::Array(apply_list_diff_dmp(list, delta)?))
        }
        Op::Text(delta) => {
            let text = a.as_str().ok_or(DeltaError::NotAString)?;
            Ok(Value::String(apply_text_delta(text, delta)?))
        }
    }
}

/// Rebuild a text diff from the current value and its delta, then apply it
/// as fuzzy patches. Per-hunk match flags are ignored.
pub(crate) fn apply_text_delta(text: &str, delta: &str) -> Result<String, DeltaError> {
    let cfg = Config::default();
    let diffs = text_delta::from_delta(text, delta)?;
    let patches = text_patch::make(&cfg, text, &diffs);
    let (patched, _matched) = text_patch::apply(&cfg, &patches, text);
    Ok(patched)
}

/// Apply an object delta. The input is cloned; iteration order over the
/// delta is irrelevant since object keys do not couple.
pub fn apply_object_diff(
    s: &Map<String, Value>,
    diffs: &Delta,
) -> Result<Map<String, Value>, DeltaError> {
    let mut out = s.clone();
    for (key, op) in diffs {
        match op {
            Op::Del => {
                out.remove(key);
            }
            _ => {
                let cur = s.get(key).cloned().unwrap_or(Value::Null);
                out.insert(key.clone(), apply_diff(&cur, op)?);
            }
        }
    }
    Ok(out)
}

/// Apply a list delta. Keys refer to positions in the origin array; the
/// running `deleted` set corrects them as removals land.
pub fn apply_list_diff(s: &[Value], diffs: &Delta) -> Result<Vec<Value>, DeltaError> {
    let mut out = s.to_vec();
    let mut entries: Vec<(usize, &Op)> = Vec::with_capacity(diffs.len());
    for (key, op) in diffs {
        entries.push((parse_index(key)?, op));
    }
    // Numeric order; the map iterates its string keys lexicographically,
    // which goes wrong past ten elements.
    entries.sort_unstable_by_key(|(index, _)| *index);

    let mut deleted: Vec<usize> = Vec::new();
    for (index, op) in entries {
        let shift = deleted.iter().filter(|&&d| d <= index).count();
        let at = index - shift;
        match op {
            Op::Ins(v) => {
                // Inserts do not consume a slot and do not join `deleted`:
                // origin positions behind them keep their indices relative
                // to the remaining work.
                let at = at.min(out.len());
                out.insert(at, v.clone());
            }
            Op::Del => {
                if at >= out.len() {
                    return Err(DeltaError::InvalidIndex(index.to_string()));
                }
                out.remove(at);
                deleted.push(at);
            }
            _ => {
                if at >= out.len() {
                    return Err(DeltaError::InvalidIndex(index.to_string()));
                }
                out[at] = apply_diff(&out[at], op)?;
            }
        }
    }
    Ok(out)
}

/// Apply a line-framed text delta to a list: serialize, patch, re-parse.
pub fn apply_list_diff_dmp(s: &[Value], delta: &str) -> Result<Vec<Value>, DeltaError> {
    let text = lines::serialize_list(s);
    let patched = apply_text_delta(&text, delta)?;
    lines::deserialize_list(&patched)
}

/// Keep integral results as JSON integers.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
