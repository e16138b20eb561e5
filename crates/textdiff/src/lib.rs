//! Character-oriented diff, fuzzy match and patch primitives.
//!
//! All positions and lengths are counted in Unicode scalar values (`char`),
//! never bytes. The crate is purely computational: [`Config`] carries the
//! tunable knobs and no state is shared between calls.

pub mod bitap;
pub mod delta;
pub mod diff;
pub mod patch;

pub use delta::DeltaSyntaxError;
pub use diff::{DiffOp, DiffTag, Diffs};
pub use patch::Patch;

/// Tunable knobs shared by the match and patch stages.
#[derive(Debug, Clone)]
pub struct Config {
    /// At what point is no match declared (0.0 = exact only, 1.0 = very loose).
    pub match_threshold: f64,
    /// How far from the expected location a match may stray before the
    /// distance penalty makes it as bad as a full mismatch.
    pub match_distance: usize,
    /// Width of the bitap state machine; longer patterns are located by
    /// their head and tail anchors or split beforehand.
    pub match_max_bits: usize,
    /// When a large block must be located fuzzily, how closely the found
    /// content has to match before the patch is discarded (0.0 = exactly,
    /// 1.0 = anything goes).
    pub patch_delete_threshold: f64,
    /// Chars of equality context kept around each patch hunk.
    pub patch_margin: usize,
    /// Cost of an edit operation boundary, used by the efficiency cleanup.
    pub edit_cost: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_threshold: 0.5,
            match_distance: 1000,
            match_max_bits: 32,
            patch_delete_threshold: 0.5,
            patch_margin: 4,
            edit_cost: 4,
        }
    }
}
