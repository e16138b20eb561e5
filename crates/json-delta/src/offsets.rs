//! Patch application that carries caret offsets through text edits.

use json_delta_textdiff::{delta as text_delta, diff as text_diff, patch as text_patch, Config, Patch};
use serde_json::{Map, Value};

use crate::error::DeltaError;
use crate::op::{Delta, Op};
use crate::patch::apply_diff;

/// Apply an object delta; the text operation at `field` (if any) remaps
/// the provided caret offsets through its edits. Offsets are char
/// positions into the field's text and are updated in place.
pub fn apply_object_diff_with_offsets(
    s: &Map<String, Value>,
    diffs: &Delta,
    field: &str,
    offsets: &mut [usize],
) -> Result<Map<String, Value>, DeltaError> {
    let cfg = Config::default();
    let mut out = s.clone();
    for (key, op) in diffs {
        match op {
            Op::Del => {
                out.remove(key);
            }
            Op::Text(delta) if key == field => {
                let cur = s
                    .get(key)
                    .and_then(Value::as_str)
                    .ok_or(DeltaError::NotAString)?;
                let d = text_delta::from_delta(cur, delta)?;
                let patches = text_patch::make(&cfg, cur, &d);
                let patched = patch_apply_with_offsets(&cfg, &patches, cur, offsets);
                out.insert(key.clone(), Value::String(patched));
            }
            _ => {
                let cur = s.get(key).cloned().unwrap_or(Value::Null);
                out.insert(key.clone(), apply_diff(&cur, op)?);
            }
        }
    }
    Ok(out)
}

/// Fuzzy patch application that advances, clamps, or shifts each offset as
/// insertions and deletions land around it. Unmatched patches are skipped
/// (their drift is still accounted for); patches whose content mismatch
/// exceeds the delete threshold leave both text and offsets untouched.
pub fn patch_apply_with_offsets(
    cfg: &Config,
    patches: &[Patch],
    src: &str,
    offsets: &mut [usize],
) -> String {
    if patches.is_empty() {
        return src.to_string();
    }
    let mut patches = patches.to_vec();
    let null_padding = text_patch::add_padding(cfg, &mut patches);
    let pad = null_padding.chars().count();
    let mut doc: Vec<char> = null_padding
        .chars()
        .chain(src.chars())
        .chain(null_padding.chars())
        .collect();
    text_patch::split_max(cfg, &mut patches);

    let mut drift: isize = 0;
    for patch in &patches {
        let expected_loc = (patch.start2 as isize + drift).max(0) as usize;
        let text1: Vec<char> = text_diff::src_text(&patch.diffs).chars().collect();
        let text1_s: String = text1.iter().collect();
        let doc_s: String = doc.iter().collect();
        let Some((start_loc, end_loc)) = text_patch::locate(cfg, &doc_s, &text1_s, expected_loc)
        else {
            drift -= patch.length2 as isize - patch.length1 as isize;
            continue;
        };
        drift = start_loc as isize - expected_loc as isize;
        let window_end = match end_loc {
            Some(el) => (el + cfg.match_max_bits).min(doc.len()),
            None => (start_loc + text1.len()).min(doc.len()),
        };
        let text2: Vec<char> = doc[start_loc..window_end].to_vec();
        let text2_s: String = text2.iter().collect();
        let diffs = text_diff::diff(&text1_s, &text2_s);
        if text1.len() > cfg.match_max_bits
            && text_diff::levenshtein(&diffs) as f64 / text1.len() as f64
                > cfg.patch_delete_threshold
        {
            // Anchors matched but the content is too far gone.
            continue;
        }
        let mut index1 = 0usize;
        for (tag, data) in &patch.diffs {
            let data_len = data.chars().count();
            if *tag != text_diff::DiffTag::Eql {
                let index2 = text_diff::x_index(&diffs, index1);
                match tag {
                    text_diff::DiffTag::Ins => {
                        let at = (start_loc + index2).min(doc.len());
                        doc.splice(at..at, data.chars());
                        for off in offsets.iter_mut() {
                            if *off + pad > at {
                                *off += data_len;
                            }
                        }
                    }
                    text_diff::DiffTag::Del => {
                        let del_start = (start_loc + index2).min(doc.len());
                        let del_end = (start_loc + text_diff::x_index(&diffs, index1 + data_len))
                            .min(doc.len());
                        if del_start < del_end {
                            let del_len = del_end - del_start;
                            doc.splice(del_start..del_end, std::iter::empty());
                            for off in offsets.iter_mut() {
                                let pos = *off + pad;
                                if pos >= del_end {
                                    *off -= del_len;
                                } else if pos > del_start {
                                    // Caret was inside the deleted span.
                                    *off = del_start.saturating_sub(pad);
                                }
                            }
                        }
                    }
                    text_diff::DiffTag::Eql => {}
                }
            }
            if *tag != text_diff::DiffTag::Del {
                index1 += data_len;
            }
        }
    }
    let end = doc.len().saturating_sub(pad);
    doc.get(pad..end)
        .map(|chars| chars.iter().collect())
        .unwrap_or_default()
}
