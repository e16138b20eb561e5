//! JSON wire codec for operations and deltas.
//!
//! An operation serializes as `{"o": code, "v": payload}` (no `v` for
//! deletes); a delta is a plain object mapping keys to operations.

use serde_json::{json, Map, Value};

use crate::error::DeltaError;
use crate::op::{Delta, Op};

/// Serialize an operation to its wire form.
pub fn op_to_json(op: &Op) -> Value {
    match op {
        Op::Ins(v) => json!({"o": "+", "v": v}),
        Op::Del => json!({"o": "-"}),
        Op::Rpl(v) => json!({"o": "r", "v": v}),
        Op::NumAdd(n) => json!({"o": "I", "v": n}),
        Op::Obj(d) => json!({"o": "O", "v": delta_to_json(d)}),
        Op::List(d) => json!({"o": "L", "v": delta_to_json(d)}),
        Op::ListText(s) => json!({"o": "dL", "v": s}),
        Op::Text(s) => json!({"o": "d", "v": s}),
    }
}

/// Serialize a delta to its wire form.
pub fn delta_to_json(delta: &Delta) -> Value {
    let mut out = Map::new();
    for (key, op) in delta {
        out.insert(key.clone(), op_to_json(op));
    }
    Value::Object(out)
}

/// Decode one operation. An unknown opcode decodes to `None` — the wire
/// contract turns it into a no-op rather than a failure. A recognized
/// opcode with a malformed payload is an error.
pub fn op_from_json(value: &Value) -> Result<Option<Op>, DeltaError> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid("operation must be an object"))?;
    let code = map
        .get("o")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("operation missing opcode"))?;
    let payload = map.get("v");
    let op = match code {
        "+" => Op::Ins(required(payload)?.clone()),
        "-" => Op::Del,
        "r" => Op::Rpl(required(payload)?.clone()),
        "I" => Op::NumAdd(
            required(payload)?
                .as_f64()
                .ok_or_else(|| invalid("numeric delta payload must be a number"))?,
        ),
        "O" => Op::Obj(delta_from_json(required(payload)?)?),
        "L" => Op::List(delta_from_json(required(payload)?)?),
        "dL" => Op::ListText(required_str(payload)?),
        "d" => Op::Text(required_str(payload)?),
        _ => return Ok(None),
    };
    Ok(Some(op))
}

/// Decode a delta object, dropping entries whose opcode is unknown.
pub fn delta_from_json(value: &Value) -> Result<Delta, DeltaError> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid("delta must be an object"))?;
    let mut out = Delta::new();
    for (key, raw) in map {
        if let Some(op) = op_from_json(raw)? {
            out.insert(key.clone(), op);
        }
    }
    Ok(out)
}

fn invalid(msg: &str) -> DeltaError {
    DeltaError::InvalidDelta(msg.to_string())
}

fn required(payload: Option<&Value>) -> Result<&Value, DeltaError> {
    payload.ok_or_else(|| invalid("operation missing payload"))
}

fn required_str(payload: Option<&Value>) -> Result<String, DeltaError> {
    Ok(required(payload)?
        .as_str()
        .ok_or_else(|| invalid("text delta payload must be a string"))?
        .to_string())
}
