//! Operation and delta model.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::DeltaError;

/// A single delta operation. The wire opcode of each variant is noted.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `+` — insert a new value at an object key or list index.
    Ins(Value),
    /// `-` — delete the value at an object key or list index.
    Del,
    /// `r` — replace the value wholesale.
    Rpl(Value),
    /// `I` — add a numeric delta (`target − origin`) to a number.
    NumAdd(f64),
    /// `O` — apply a nested object delta.
    Obj(Delta),
    /// `L` — apply a nested positional list delta.
    List(Delta),
    /// `dL` — apply a line-framed text delta to a list.
    ListText(String),
    /// `d` — apply a text delta to a string.
    Text(String),
}

/// A delta: operations keyed by object field or stringified list index.
/// An empty delta means "no change".
pub type Delta = BTreeMap<String, Op>;

impl Op {
    /// The wire opcode for this operation.
    pub fn opcode(&self) -> &'static str {
        match self {
            Op::Ins(_) => "+",
            Op::Del => "-",
            Op::Rpl(_) => "r",
            Op::NumAdd(_) => "I",
            Op::Obj(_) => "O",
            Op::List(_) => "L",
            Op::ListText(_) => "dL",
            Op::Text(_) => "d",
        }
    }
}

/// List delta keys are origin-array indices rendered as strings; they must
/// be compared numerically, never lexicographically.
pub(crate) fn parse_index(key: &str) -> Result<usize, DeltaError> {
    key.parse()
        .map_err(|_| DeltaError::InvalidIndex(key.to_string()))
}
