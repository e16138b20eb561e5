use json_delta_textdiff::DeltaSyntaxError;
use thiserror::Error;

/// Errors surfaced when a delta is corrupt or targets the wrong shape.
///
/// The wire format stays permissive where the protocol demands it (unknown
/// opcodes decode to no-ops, unmatched fuzzy patches are skipped); these
/// errors cover the cases that indicate a mis-targeted or malformed delta.
#[derive(Debug, Error, PartialEq)]
pub enum DeltaError {
    #[error("NOT_AN_OBJECT")]
    NotAnObject,
    #[error("NOT_A_LIST")]
    NotAList,
    #[error("NOT_A_STRING")]
    NotAString,
    #[error("NOT_A_NUMBER")]
    NotANumber,
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(String),
    #[error("INVALID_DELTA: {0}")]
    InvalidDelta(String),
    #[error("INVALID_POLICY: {0}")]
    InvalidPolicy(String),
}

impl From<DeltaSyntaxError> for DeltaError {
    fn from(err: DeltaSyntaxError) -> Self {
        DeltaError::InvalidDelta(err.to_string())
    }
}
