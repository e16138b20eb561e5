//! Character-level diff with cleanup passes.

use std::collections::HashMap;

/// Kind of a single diff record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    Del = -1,
    Eql = 0,
    Ins = 1,
}

pub type DiffOp = (DiffTag, String);
pub type Diffs = Vec<DiffOp>;

/// Diff two strings into a list of edit operations.
pub fn diff(src: &str, dst: &str) -> Diffs {
    let a: Vec<char> = src.chars().collect();
    let b: Vec<char> = dst.chars().collect();
    let mut diffs = diff_slices(&a, &b);
    cleanup_merge(&mut diffs);
    diffs
}

fn diff_slices(a: &[char], b: &[char]) -> Diffs {
    if a == b {
        if a.is_empty() {
            return vec![];
        }
        return vec![(DiffTag::Eql, text_of(a))];
    }

    let prefix = common_prefix_slice(a, b);
    let suffix = common_suffix_slice(&a[prefix..], &b[prefix..]);

    let mut diffs = compute(&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]);
    if prefix > 0 {
        diffs.insert(0, (DiffTag::Eql, text_of(&a[..prefix])));
    }
    if suffix > 0 {
        diffs.push((DiffTag::Eql, text_of(&a[a.len() - suffix..])));
    }
    diffs
}

fn compute(a: &[char], b: &[char]) -> Diffs {
    if a.is_empty() {
        return vec![(DiffTag::Ins, text_of(b))];
    }
    if b.is_empty() {
        return vec![(DiffTag::Del, text_of(a))];
    }

    let (long, short, src_longer) = if a.len() > b.len() {
        (a, b, true)
    } else {
        (b, a, false)
    };
    if let Some(index) = long.windows(short.len()).position(|w| w == short) {
        // The shorter text sits whole inside the longer one.
        let tag = if src_longer { DiffTag::Del } else { DiffTag::Ins };
        return vec![
            (tag, text_of(&long[..index])),
            (DiffTag::Eql, text_of(short)),
            (tag, text_of(&long[index + short.len()..])),
        ];
    }
    if short.len() == 1 {
        // After the affix trim a lone char shares nothing with the other side.
        return vec![(DiffTag::Del, text_of(a)), (DiffTag::Ins, text_of(b))];
    }

    bisect(a, b)
}

/// Find the middle snake of the edit path, then recurse on both halves.
fn bisect(a: &[char], b: &[char]) -> Diffs {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_length = (2 * max_d + 2) as usize;
    let mut v1 = vec![-1isize; v_length];
    let mut v2 = vec![-1isize; v_length];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n - m;
    // If the total length is odd, the front path hits the overlap first.
    let front = delta % 2 != 0;
    let mut k1start = 0isize;
    let mut k1end = 0isize;
    let mut k2start = 0isize;
    let mut k2end = 0isize;

    for d in 0..max_d {
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n {
                k1end += 2;
            } else if y1 > m {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && (k2_offset as usize) < v_length && v2[k2_offset as usize] != -1
                {
                    // Mirror the reverse path onto forward coordinates.
                    let x2 = n - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n && y2 < m && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize] {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n {
                k2end += 2;
            } else if y2 > m {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && (k1_offset as usize) < v_length && v1[k1_offset as usize] != -1
                {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n - x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize);
                    }
                }
            }
            k2 += 2;
        }
    }

    // No commonality at all.
    vec![(DiffTag::Del, text_of(a)), (DiffTag::Ins, text_of(b))]
}

fn bisect_split(a: &[char], b: &[char], x: usize, y: usize) -> Diffs {
    let mut diffs = diff_slices(&a[..x], &b[..y]);
    diffs.extend(diff_slices(&a[x..], &b[y..]));
    diffs
}

// ── Line mode ─────────────────────────────────────────────────────────────

/// Line-granular diff: encode unique lines as placeholder chars, diff the
/// encoded strings, then rehydrate. Every record boundary falls on a line
/// boundary of the inputs.
pub fn diff_line_mode(src: &str, dst: &str) -> Diffs {
    let (enc_src, enc_dst, lines) = lines_to_chars(src, dst);
    let mut diffs = diff(&enc_src, &enc_dst);
    chars_to_lines(&mut diffs, &lines);
    diffs
}

fn lines_to_chars(src: &str, dst: &str) -> (String, String, Vec<String>) {
    // Index 0 is reserved so placeholders start at codepoint 1.
    let mut line_array: Vec<String> = vec![String::new()];
    let mut line_hash: HashMap<String, usize> = HashMap::new();
    let enc_src = encode_lines(src, &mut line_array, &mut line_hash);
    let enc_dst = encode_lines(dst, &mut line_array, &mut line_hash);
    (enc_src, enc_dst, line_array)
}

fn encode_lines(
    text: &str,
    line_array: &mut Vec<String>,
    line_hash: &mut HashMap<String, usize>,
) -> String {
    let mut encoded = String::new();
    let mut start = 0usize;
    while start < text.len() {
        let end = match text[start..].find('\n') {
            Some(i) => start + i + 1,
            None => text.len(),
        };
        let line = &text[start..end];
        let index = match line_hash.get(line) {
            Some(&i) => i,
            None => {
                line_array.push(line.to_string());
                let i = line_array.len() - 1;
                line_hash.insert(line.to_string(), i);
                i
            }
        };
        encoded.push(line_placeholder(index));
        start = end;
    }
    encoded
}

fn line_placeholder(index: usize) -> char {
    // Hop over the surrogate block, which scalar values cannot occupy.
    let code = if index >= 0xD800 { index + 0x800 } else { index } as u32;
    char::from_u32(code).expect("too many distinct lines to encode")
}

fn chars_to_lines(diffs: &mut Diffs, line_array: &[String]) {
    for (_, text) in diffs.iter_mut() {
        let mut out = String::new();
        for ch in text.chars() {
            let code = ch as usize;
            let index = if code >= 0xE000 { code - 0x800 } else { code };
            out.push_str(&line_array[index]);
        }
        *text = out;
    }
}

// ── Cleanup passes ────────────────────────────────────────────────────────

/// Reorder and merge like edit sections, factoring out commonalities.
pub fn cleanup_merge(diffs: &mut Diffs) {
    if diffs.is_empty() {
        return;
    }
    diffs.push((DiffTag::Eql, String::new())); // sentinel
    let mut pointer = 0usize;
    let mut count_delete = 0usize;
    let mut count_insert = 0usize;
    let mut text_delete = String::new();
    let mut text_insert = String::new();

    while pointer < diffs.len() {
        match diffs[pointer].0 {
            DiffTag::Ins => {
                count_insert += 1;
                text_insert.push_str(&diffs[pointer].1);
                pointer += 1;
            }
            DiffTag::Del => {
                count_delete += 1;
                text_delete.push_str(&diffs[pointer].1);
                pointer += 1;
            }
            DiffTag::Eql => {
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        // Factor out the common prefix of the paired edits.
                        let ins: Vec<char> = text_insert.chars().collect();
                        let del: Vec<char> = text_delete.chars().collect();
                        let common = common_prefix_slice(&ins, &del);
                        if common > 0 {
                            let prefix = text_of(&ins[..common]);
                            let anchor = pointer - count_delete - count_insert;
                            if anchor > 0 && diffs[anchor - 1].0 == DiffTag::Eql {
                                diffs[anchor - 1].1.push_str(&prefix);
                            } else {
                                diffs.insert(0, (DiffTag::Eql, prefix));
                                pointer += 1;
                            }
                            text_insert = text_of(&ins[common..]);
                            text_delete = text_of(&del[common..]);
                        }
                        // Factor out the common suffix.
                        let ins: Vec<char> = text_insert.chars().collect();
                        let del: Vec<char> = text_delete.chars().collect();
                        let common = common_suffix_slice(&ins, &del);
                        if common > 0 {
                            let suffix = text_of(&ins[ins.len() - common..]);
                            let existing = diffs[pointer].1.clone();
                            diffs[pointer].1 = format!("{suffix}{existing}");
                            text_insert = text_of(&ins[..ins.len() - common]);
                            text_delete = text_of(&del[..del.len() - common]);
                        }
                    }
                    // Collapse the run into at most one delete and one insert.
                    let start = pointer - count_delete - count_insert;
                    let mut replacement: Diffs = Vec::with_capacity(2);
                    if !text_delete.is_empty() {
                        replacement.push((DiffTag::Del, text_delete.clone()));
                    }
                    if !text_insert.is_empty() {
                        replacement.push((DiffTag::Ins, text_insert.clone()));
                    }
                    let new_len = replacement.len();
                    diffs.splice(start..pointer, replacement);
                    pointer = start + new_len + 1;
                } else if pointer != 0 && diffs[pointer - 1].0 == DiffTag::Eql {
                    // Merge this equality into the previous one.
                    let text = diffs.remove(pointer).1;
                    diffs[pointer - 1].1.push_str(&text);
                } else {
                    pointer += 1;
                }
                count_delete = 0;
                count_insert = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }
    if diffs.last().is_some_and(|(_, text)| text.is_empty()) {
        diffs.pop();
    }

    // Single edits surrounded by equalities can sometimes be shifted
    // sideways to eliminate an equality.
    let mut changes = false;
    let mut pointer = 1usize;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].0 == DiffTag::Eql && diffs[pointer + 1].0 == DiffTag::Eql {
            let prev = diffs[pointer - 1].1.clone();
            let curr = diffs[pointer].1.clone();
            let next = diffs[pointer + 1].1.clone();
            if curr.ends_with(&prev) {
                let core = curr[..curr.len() - prev.len()].to_string();
                diffs[pointer].1 = format!("{prev}{core}");
                diffs[pointer + 1].1 = format!("{prev}{next}");
                diffs.remove(pointer - 1);
                changes = true;
            } else if curr.starts_with(&next) {
                diffs[pointer - 1].1.push_str(&next);
                let rest = curr[next.len()..].to_string();
                diffs[pointer].1 = format!("{rest}{next}");
                diffs.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }
    if changes {
        cleanup_merge(diffs);
    }
}

/// Eliminate equalities that cost more to keep than to retype.
pub fn cleanup_efficiency(diffs: &mut Diffs, edit_cost: usize) {
    let mut changes = false;
    // Indices of candidate equalities.
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<String> = None;
    let mut pointer: isize = 0;
    // Edits seen before/after the candidate equality.
    let mut pre_ins = false;
    let mut pre_del = false;
    let mut post_ins = false;
    let mut post_del = false;

    while (pointer as usize) < diffs.len() {
        let idx = pointer as usize;
        if diffs[idx].0 == DiffTag::Eql {
            if diffs[idx].1.chars().count() < edit_cost && (post_ins || post_del) {
                equalities.push(idx);
                pre_ins = post_ins;
                pre_del = post_del;
                last_equality = Some(diffs[idx].1.clone());
            } else {
                equalities.clear();
                last_equality = None;
            }
            post_ins = false;
            post_del = false;
        } else {
            if diffs[idx].0 == DiffTag::Del {
                post_del = true;
            } else {
                post_ins = true;
            }
            let surrounded =
                pre_ins as usize + pre_del as usize + post_ins as usize + post_del as usize;
            if let Some(eq) = last_equality.clone() {
                if (pre_ins && pre_del && post_ins && post_del)
                    || (eq.chars().count() * 2 < edit_cost && surrounded == 3)
                {
                    let pos = *equalities.last().expect("candidate recorded");
                    diffs.insert(pos, (DiffTag::Del, eq.clone()));
                    diffs[pos + 1].0 = DiffTag::Ins;
                    equalities.pop();
                    last_equality = None;
                    if pre_ins && pre_del {
                        post_ins = true;
                        post_del = true;
                        equalities.clear();
                    } else {
                        equalities.pop();
                        pointer = equalities.last().map(|&x| x as isize).unwrap_or(-1);
                        post_ins = false;
                        post_del = false;
                    }
                    changes = true;
                }
            }
        }
        pointer += 1;
    }
    if changes {
        cleanup_merge(diffs);
    }
}

// ── Projections ───────────────────────────────────────────────────────────

/// The pre-image of a diff (equalities and deletions).
pub fn src_text(diffs: &Diffs) -> String {
    let mut text = String::new();
    for (tag, part) in diffs {
        if *tag != DiffTag::Ins {
            text.push_str(part);
        }
    }
    text
}

/// The post-image of a diff (equalities and insertions).
pub fn dst_text(diffs: &Diffs) -> String {
    let mut text = String::new();
    for (tag, part) in diffs {
        if *tag != DiffTag::Del {
            text.push_str(part);
        }
    }
    text
}

/// Project a location in the diff's source text onto its destination text.
pub fn x_index(diffs: &Diffs, loc: usize) -> usize {
    let mut chars1 = 0usize;
    let mut chars2 = 0usize;
    let mut last_chars1 = 0usize;
    let mut last_chars2 = 0usize;
    let mut deleted_here = false;
    for (tag, text) in diffs {
        let len = text.chars().count();
        if *tag != DiffTag::Ins {
            chars1 += len;
        }
        if *tag != DiffTag::Del {
            chars2 += len;
        }
        if chars1 > loc {
            deleted_here = *tag == DiffTag::Del;
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }
    if deleted_here {
        // The location itself was deleted.
        last_chars2
    } else {
        last_chars2 + (loc - last_chars1)
    }
}

/// Edit weight of a diff: the larger leg of each paired change.
pub fn levenshtein(diffs: &Diffs) -> usize {
    let mut total = 0usize;
    let mut insertions = 0usize;
    let mut deletions = 0usize;
    for (tag, text) in diffs {
        let len = text.chars().count();
        match tag {
            DiffTag::Ins => insertions += len,
            DiffTag::Del => deletions += len,
            DiffTag::Eql => {
                total += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    total + insertions.max(deletions)
}

// ── Shared helpers ────────────────────────────────────────────────────────

fn text_of(chars: &[char]) -> String {
    chars.iter().collect()
}

fn common_prefix_slice(a: &[char], b: &[char]) -> usize {
    let n = a.len().min(b.len());
    let mut i = 0;
    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

fn common_suffix_slice(a: &[char], b: &[char]) -> usize {
    let n = a.len().min(b.len());
    let mut i = 0;
    while i < n && a[a.len() - 1 - i] == b[b.len() - 1 - i] {
        i += 1;
    }
    i
}
