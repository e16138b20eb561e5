//! Context patches over character diffs, with fuzzy application.

use crate::bitap::match_main;
use crate::diff::{self, DiffTag, Diffs};
use crate::Config;

/// One hunk of edits plus surrounding equality context. `start1`/`length1`
/// describe the pre-image span, `start2`/`length2` the post-image span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub diffs: Diffs,
    pub start1: usize,
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
}

/// Build a list of patches from a source text and a diff toward the target.
pub fn make(cfg: &Config, src: &str, diffs: &Diffs) -> Vec<Patch> {
    let mut patches: Vec<Patch> = Vec::new();
    if diffs.is_empty() {
        return patches;
    }
    let mut patch = Patch::default();
    let mut char_count1 = 0usize;
    let mut char_count2 = 0usize;
    // `prepatch` tracks the text a patch's context is cut from; `postpatch`
    // tracks the text as already-emitted hunks see it.
    let mut prepatch: Vec<char> = src.chars().collect();
    let mut postpatch: Vec<char> = prepatch.clone();

    for (i, (tag, text)) in diffs.iter().enumerate() {
        let len = text.chars().count();
        if patch.diffs.is_empty() && *tag != DiffTag::Eql {
            patch.start1 = char_count1;
            patch.start2 = char_count2;
        }
        match tag {
            DiffTag::Ins => {
                patch.diffs.push((*tag, text.clone()));
                patch.length2 += len;
                postpatch.splice(char_count2..char_count2, text.chars());
            }
            DiffTag::Del => {
                patch.diffs.push((*tag, text.clone()));
                patch.length1 += len;
                postpatch.splice(char_count2..char_count2 + len, std::iter::empty());
            }
            DiffTag::Eql => {
                if len <= 2 * cfg.patch_margin && !patch.diffs.is_empty() && i + 1 != diffs.len() {
                    // Small equality within a hunk: keep it.
                    patch.diffs.push((*tag, text.clone()));
                    patch.length1 += len;
                    patch.length2 += len;
                } else if len >= 2 * cfg.patch_margin && !patch.diffs.is_empty() {
                    // Large equality: close out the current hunk.
                    add_context(cfg, &mut patch, &prepatch);
                    patches.push(std::mem::take(&mut patch));
                    prepatch = postpatch.clone();
                    char_count1 = char_count2;
                }
            }
        }
        if *tag != DiffTag::Ins {
            char_count1 += len;
        }
        if *tag != DiffTag::Del {
            char_count2 += len;
        }
    }
    if !patch.diffs.is_empty() {
        add_context(cfg, &mut patch, &prepatch);
        patches.push(patch);
    }
    patches
}

/// Grow equality context around a hunk until its pre-image is unique in the
/// text (or the bitap width bound is hit).
fn add_context(cfg: &Config, patch: &mut Patch, text: &[char]) {
    if text.is_empty() {
        return;
    }
    let mut pattern: Vec<char> = text[patch.start2..patch.start2 + patch.length1].to_vec();
    let mut padding = 0usize;
    while occurs_more_than_once(text, &pattern)
        && pattern.len() < cfg.match_max_bits - 2 * cfg.patch_margin
    {
        padding += cfg.patch_margin;
        let start = patch.start2.saturating_sub(padding);
        let end = (patch.start2 + patch.length1 + padding).min(text.len());
        pattern = text[start..end].to_vec();
    }
    // One margin of breathing room.
    padding += cfg.patch_margin;

    let prefix_start = patch.start2.saturating_sub(padding);
    let prefix: String = text[prefix_start..patch.start2].iter().collect();
    if !prefix.is_empty() {
        patch.diffs.insert(0, (DiffTag::Eql, prefix.clone()));
    }
    let suffix_end = (patch.start2 + patch.length1 + padding).min(text.len());
    let suffix: String = text[patch.start2 + patch.length1..suffix_end].iter().collect();
    if !suffix.is_empty() {
        patch.diffs.push((DiffTag::Eql, suffix.clone()));
    }
    let prefix_len = prefix.chars().count();
    let suffix_len = suffix.chars().count();
    patch.start1 = patch.start1.saturating_sub(prefix_len);
    patch.start2 = patch.start2.saturating_sub(prefix_len);
    patch.length1 += prefix_len + suffix_len;
    patch.length2 += prefix_len + suffix_len;
}

fn occurs_more_than_once(text: &[char], pattern: &[char]) -> bool {
    if pattern.is_empty() {
        return true;
    }
    if pattern.len() > text.len() {
        return false;
    }
    let mut found = None;
    for i in 0..=text.len() - pattern.len() {
        if text[i..i + pattern.len()] == *pattern {
            if found.is_some() {
                return true;
            }
            found = Some(i);
        }
    }
    false
}

/// Pad the first and last patch with edge context so edits at the document
/// boundaries have something to anchor on. Returns the padding text.
pub fn add_padding(cfg: &Config, patches: &mut [Patch]) -> String {
    let padding_length = cfg.patch_margin;
    let null_padding: String = (1..=padding_length as u8).map(char::from).collect();
    let null_chars: Vec<char> = null_padding.chars().collect();

    for patch in patches.iter_mut() {
        patch.start1 += padding_length;
        patch.start2 += padding_length;
    }

    if let Some(first) = patches.first_mut() {
        if first.diffs.first().map_or(true, |d| d.0 != DiffTag::Eql) {
            first.diffs.insert(0, (DiffTag::Eql, null_padding.clone()));
            first.start1 -= padding_length;
            first.start2 -= padding_length;
            first.length1 += padding_length;
            first.length2 += padding_length;
        } else {
            let existing = first.diffs[0].1.chars().count();
            if padding_length > existing {
                let extra = padding_length - existing;
                let grown: String = null_chars[existing..].iter().collect();
                first.diffs[0].1 = format!("{}{}", grown, first.diffs[0].1);
                first.start1 -= extra;
                first.start2 -= extra;
                first.length1 += extra;
                first.length2 += extra;
            }
        }
    }

    if let Some(last) = patches.last_mut() {
        if last.diffs.last().map_or(true, |d| d.0 != DiffTag::Eql) {
            last.diffs.push((DiffTag::Eql, null_padding.clone()));
            last.length1 += padding_length;
            last.length2 += padding_length;
        } else {
            let existing = last.diffs.last().map(|d| d.1.chars().count()).unwrap_or(0);
            if padding_length > existing {
                let extra = padding_length - existing;
                let grown: String = null_chars[..extra].iter().collect();
                if let Some(d) = last.diffs.last_mut() {
                    d.1.push_str(&grown);
                }
                last.length1 += extra;
                last.length2 += extra;
            }
        }
    }

    null_padding
}

/// Split patches whose pre-image is wider than the bitap machine.
pub fn split_max(cfg: &Config, patches: &mut Vec<Patch>) {
    let patch_size = cfg.match_max_bits;
    let margin = cfg.patch_margin;
    let mut x = 0usize;
    while x < patches.len() {
        if patches[x].length1 <= patch_size {
            x += 1;
            continue;
        }
        let mut bigpatch = patches.remove(x);
        let mut insert_at = x;
        let mut start1 = bigpatch.start1;
        let mut start2 = bigpatch.start2;
        let mut precontext: Vec<char> = Vec::new();
        while !bigpatch.diffs.is_empty() {
            let mut patch = Patch {
                start1: start1.saturating_sub(precontext.len()),
                start2: start2.saturating_sub(precontext.len()),
                ..Patch::default()
            };
            let mut empty = true;
            if !precontext.is_empty() {
                patch.length1 = precontext.len();
                patch.length2 = precontext.len();
                patch
                    .diffs
                    .push((DiffTag::Eql, precontext.iter().collect()));
            }
            while !bigpatch.diffs.is_empty() && patch.length1 < patch_size - margin {
                let (tag, text) = bigpatch.diffs[0].clone();
                let text_len = text.chars().count();
                match tag {
                    DiffTag::Ins => {
                        patch.length2 += text_len;
                        start2 += text_len;
                        patch.diffs.push(bigpatch.diffs.remove(0));
                        empty = false;
                    }
                    DiffTag::Del
                        if patch.diffs.len() == 1
                            && patch.diffs[0].0 == DiffTag::Eql
                            && text_len > 2 * patch_size =>
                    {
                        // An oversized deletion travels whole.
                        patch.length1 += text_len;
                        start1 += text_len;
                        empty = false;
                        patch.diffs.push((tag, text));
                        bigpatch.diffs.remove(0);
                    }
                    _ => {
                        let take = text_len.min(patch_size - patch.length1 - margin);
                        let taken: String = text.chars().take(take).collect();
                        patch.length1 += take;
                        start1 += take;
                        if tag == DiffTag::Eql {
                            patch.length2 += take;
                            start2 += take;
                        } else {
                            empty = false;
                        }
                        patch.diffs.push((tag, taken));
                        if take == text_len {
                            bigpatch.diffs.remove(0);
                        } else {
                            bigpatch.diffs[0].1 = text.chars().skip(take).collect();
                        }
                    }
                }
            }
            // Trailing context of what this piece produced feeds the next.
            let produced: Vec<char> = diff::dst_text(&patch.diffs).chars().collect();
            precontext = produced[produced.len().saturating_sub(margin)..].to_vec();
            let postcontext: String = diff::src_text(&bigpatch.diffs)
                .chars()
                .take(margin)
                .collect();
            if !postcontext.is_empty() {
                let post_len = postcontext.chars().count();
                patch.length1 += post_len;
                patch.length2 += post_len;
                match patch.diffs.last_mut() {
                    Some(last) if last.0 == DiffTag::Eql => last.1.push_str(&postcontext),
                    _ => patch.diffs.push((DiffTag::Eql, postcontext)),
                }
            }
            if !empty {
                patches.insert(insert_at, patch);
                insert_at += 1;
            }
        }
        x = insert_at;
    }
}

/// Locate a patch pre-image in `doc` near `expected_loc`. Oversized
/// pre-images are located by their head and tail anchors; a missing or
/// inverted tail anchor fails the whole match. Returns the start position
/// and, for anchored matches, the tail anchor position.
pub fn locate(
    cfg: &Config,
    doc: &str,
    text1: &str,
    expected_loc: usize,
) -> Option<(usize, Option<usize>)> {
    let chars: Vec<char> = text1.chars().collect();
    if chars.len() > cfg.match_max_bits {
        let head: String = chars[..cfg.match_max_bits].iter().collect();
        let start_loc = match_main(cfg, doc, &head, expected_loc)?;
        let tail: String = chars[chars.len() - cfg.match_max_bits..].iter().collect();
        let end_loc = match_main(
            cfg,
            doc,
            &tail,
            expected_loc + chars.len() - cfg.match_max_bits,
        )?;
        if start_loc >= end_loc {
            return None;
        }
        Some((start_loc, Some(end_loc)))
    } else {
        match_main(cfg, doc, text1, expected_loc).map(|loc| (loc, None))
    }
}

/// Apply patches to a text, fuzzily locating each hunk. Returns the patched
/// text and a per-patch success flag.
pub fn apply(cfg: &Config, patches: &[Patch], src: &str) -> (String, Vec<bool>) {
    if patches.is_empty() {
        return (src.to_string(), vec![]);
    }
    let mut patches = patches.to_vec();
    let null_padding = add_padding(cfg, &mut patches);
    let pad = null_padding.chars().count();
    let mut doc: Vec<char> = null_padding
        .chars()
        .chain(src.chars())
        .chain(null_padding.chars())
        .collect();
    split_max(cfg, &mut patches);

    let mut results = vec![false; patches.len()];
    let mut drift: isize = 0;
    for (i, patch) in patches.iter().enumerate() {
        let expected_loc = (patch.start2 as isize + drift).max(0) as usize;
        let text1: Vec<char> = diff::src_text(&patch.diffs).chars().collect();
        let text1_s: String = text1.iter().collect();
        let doc_s: String = doc.iter().collect();
        let Some((start_loc, end_loc)) = locate(cfg, &doc_s, &text1_s, expected_loc) else {
            // No match: keep later patches honest about their positions.
            drift -= patch.length2 as isize - patch.length1 as isize;
            continue;
        };
        results[i] = true;
        drift = start_loc as isize - expected_loc as isize;
        let window_end = match end_loc {
            Some(el) => (el + cfg.match_max_bits).min(doc.len()),
            None => (start_loc + text1.len()).min(doc.len()),
        };
        let text2: Vec<char> = doc[start_loc..window_end].to_vec();
        if text1 == text2 {
            // Perfect match: splice the target text straight in.
            let replacement: Vec<char> = diff::dst_text(&patch.diffs).chars().collect();
            doc.splice(start_loc..start_loc + text1.len(), replacement);
            continue;
        }
        // Imperfect match: project the hunk's edits through a char diff of
        // expected vs found content.
        let text2_s: String = text2.iter().collect();
        let diffs = diff::diff(&text1_s, &text2_s);
        if text1.len() > cfg.match_max_bits
            && diff::levenshtein(&diffs) as f64 / text1.len() as f64 > cfg.patch_delete_threshold
        {
            // The anchors matched but the content is too far gone.
            results[i] = false;
            continue;
        }
        let mut index1 = 0usize;
        for (tag, data) in &patch.diffs {
            let data_len = data.chars().count();
            if *tag != DiffTag::Eql {
                let index2 = diff::x_index(&diffs, index1);
                match tag {
                    DiffTag::Ins => {
                        let at = (start_loc + index2).min(doc.len());
                        doc.splice(at..at, data.chars());
                    }
                    DiffTag::Del => {
                        let del_start = (start_loc + index2).min(doc.len());
                        let del_end =
                            (start_loc + diff::x_index(&diffs, index1 + data_len)).min(doc.len());
                        if del_start < del_end {
                            doc.splice(del_start..del_end, std::iter::empty());
                        }
                    }
                    DiffTag::Eql => {}
                }
            }
            if *tag != DiffTag::Del {
                index1 += data_len;
            }
        }
    }
    let end = doc.len().saturating_sub(pad);
    let out: String = doc
        .get(pad..end)
        .map(|chars| chars.iter().collect())
        .unwrap_or_default();
    (out, results)
}
