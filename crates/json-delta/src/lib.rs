//! json-delta — structural deltas over JSON values.
//!
//! Computes compact deltas between two JSON documents, applies them, and
//! operationally transforms concurrent deltas rooted at a shared base so
//! that either ordering converges. String edits delegate to the
//! `json-delta-textdiff` character differ; caret offsets can be carried
//! through text patches.

pub mod cli;
pub mod codec;
pub mod diff;
pub mod error;
pub mod lines;
pub mod offsets;
pub mod op;
pub mod patch;
pub mod policy;
pub mod transform;

pub use codec::{delta_from_json, delta_to_json, op_from_json, op_to_json};
pub use diff::{diff, list_diff, list_diff_dmp, object_diff};
pub use error::DeltaError;
pub use json_delta_util::deep_equal;
pub use offsets::{apply_object_diff_with_offsets, patch_apply_with_offsets};
pub use op::{Delta, Op};
pub use patch::{apply_diff, apply_list_diff, apply_list_diff_dmp, apply_object_diff};
pub use policy::{OType, Policy};
pub use transform::{transform_list_diff, transform_list_diff_dmp, transform_object_diff};
