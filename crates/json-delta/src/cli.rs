//! Core logic for the `delta-diff` and `delta-patch` binaries.

use serde_json::Value;

use crate::codec::{op_from_json, op_to_json};
use crate::diff::diff;
use crate::patch::apply_diff;
use crate::policy::Policy;

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Delta(String),
    Policy(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e) => write!(f, "{e}"),
            CliError::Delta(e) => write!(f, "{e}"),
            CliError::Policy(e) => write!(f, "{e}"),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

/// Diff two documents, printing the operation (or `{}` when equal).
pub fn diff_documents(
    origin_json: &str,
    target_json: &str,
    policy_json: Option<&str>,
) -> Result<String, CliError> {
    let origin: Value = serde_json::from_str(origin_json)?;
    let target: Value = serde_json::from_str(target_json)?;
    let policy = match policy_json {
        Some(p) => Some(
            Policy::from_json(&serde_json::from_str(p)?)
                .map_err(|e| CliError::Policy(e.to_string()))?,
        ),
        None => None,
    };
    let result = match diff(&origin, &target, policy.as_ref()) {
        Some(op) => op_to_json(&op),
        None => serde_json::json!({}),
    };
    Ok(serde_json::to_string_pretty(&result)?)
}

/// Apply an operation (as produced by `delta-diff`) to a document.
pub fn patch_document(doc_json: &str, op_json: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let raw: Value = serde_json::from_str(op_json)?;
    let result = if raw.as_object().is_some_and(|m| !m.contains_key("o")) {
        // An object without an opcode is the empty "no change" delta.
        doc
    } else {
        match op_from_json(&raw).map_err(|e| CliError::Delta(e.to_string()))? {
            Some(op) => apply_diff(&doc, &op).map_err(|e| CliError::Delta(e.to_string()))?,
            None => doc,
        }
    };
    Ok(serde_json::to_string_pretty(&result)?)
}
