//! Compact delta encoding of diffs against a known source text.
//!
//! A delta is a tab-separated token list: `=N` copies N source chars, `-N`
//! skips N source chars, `+text` inserts percent-encoded text. Counts are
//! Unicode scalar values.

use thiserror::Error;

use crate::diff::{DiffTag, Diffs};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeltaSyntaxError {
    #[error("invalid delta token: {0}")]
    BadToken(String),
    #[error("invalid character count: {0}")]
    BadCount(String),
    #[error("invalid percent-encoding: {0}")]
    BadEncoding(String),
    #[error("delta spans {0} chars, source has {1}")]
    LengthMismatch(usize, usize),
}

/// Encode a diff as a compact delta string.
pub fn to_delta(diffs: &Diffs) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(diffs.len());
    for (tag, text) in diffs {
        match tag {
            DiffTag::Ins => tokens.push(format!("+{}", encode_text(text))),
            DiffTag::Del => tokens.push(format!("-{}", text.chars().count())),
            DiffTag::Eql => tokens.push(format!("={}", text.chars().count())),
        }
    }
    tokens.join("\t")
}

/// Rebuild the full diff from a source text and a compact delta.
pub fn from_delta(src: &str, delta: &str) -> Result<Diffs, DeltaSyntaxError> {
    let src_chars: Vec<char> = src.chars().collect();
    let mut diffs: Diffs = Vec::new();
    let mut pos = 0usize;
    for token in delta.split('\t') {
        if token.is_empty() {
            // Blank tokens (e.g. from a trailing tab) carry nothing.
            continue;
        }
        let head = token.chars().next().expect("token is non-empty");
        let body = &token[head.len_utf8()..];
        match head {
            '+' => diffs.push((DiffTag::Ins, decode_text(body)?)),
            '-' | '=' => {
                let n: usize = body
                    .parse()
                    .map_err(|_| DeltaSyntaxError::BadCount(body.to_string()))?;
                if pos + n > src_chars.len() {
                    return Err(DeltaSyntaxError::LengthMismatch(pos + n, src_chars.len()));
                }
                let text: String = src_chars[pos..pos + n].iter().collect();
                pos += n;
                let tag = if head == '=' { DiffTag::Eql } else { DiffTag::Del };
                diffs.push((tag, text));
            }
            _ => return Err(DeltaSyntaxError::BadToken(token.to_string())),
        }
    }
    if pos != src_chars.len() {
        return Err(DeltaSyntaxError::LengthMismatch(pos, src_chars.len()));
    }
    Ok(diffs)
}

// Characters left bare by the encoding, besides ASCII alphanumerics.
// Matches URI encoding with space kept literal for readability.
const SAFE: &str = " ;,/?:@&=+$-_.!~*'()#";

fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || SAFE.contains(ch) {
            out.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).as_bytes() {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

fn decode_text(body: &str) -> Result<String, DeltaSyntaxError> {
    let bytes = body.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .ok_or_else(|| DeltaSyntaxError::BadEncoding(body.to_string()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| DeltaSyntaxError::BadEncoding(body.to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| DeltaSyntaxError::BadEncoding(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;

    #[test]
    fn encodes_the_three_record_kinds() {
        let d = vec![
            (DiffTag::Eql, "jump".to_string()),
            (DiffTag::Del, "s".to_string()),
            (DiffTag::Ins, "ed".to_string()),
        ];
        assert_eq!(to_delta(&d), "=4\t-1\t+ed");
    }

    #[test]
    fn roundtrips_real_diffs() {
        let cases = [
            ("jumps over the lazy", "jumped over a lazy"),
            ("", "fresh"),
            ("stale", ""),
            ("same", "same"),
            ("tab\tand\nnewline", "tab\tor\nnewline"),
        ];
        for (src, dst) in cases {
            let d = diff(src, dst);
            let delta = to_delta(&d);
            let rebuilt = from_delta(src, &delta).expect("delta must parse");
            assert_eq!(rebuilt, d, "roundtrip failed for {src:?} -> {dst:?}");
        }
    }

    #[test]
    fn roundtrips_non_ascii_inserts() {
        let d = diff("plain", "plain — héllo ✓");
        let delta = to_delta(&d);
        let rebuilt = from_delta("plain", &delta).expect("delta must parse");
        assert_eq!(crate::diff::dst_text(&rebuilt), "plain — héllo ✓");
    }

    #[test]
    fn counts_are_chars_not_bytes() {
        let d = diff("héé", "h");
        let delta = to_delta(&d);
        assert_eq!(delta, "=1\t-2");
        assert!(from_delta("héé", &delta).is_ok());
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(matches!(
            from_delta("abc", "x3"),
            Err(DeltaSyntaxError::BadToken(_))
        ));
        assert!(matches!(
            from_delta("abc", "=x"),
            Err(DeltaSyntaxError::BadCount(_))
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(matches!(
            from_delta("abc", "=2"),
            Err(DeltaSyntaxError::LengthMismatch(2, 3))
        ));
        assert!(matches!(
            from_delta("abc", "=5"),
            Err(DeltaSyntaxError::LengthMismatch(5, 3))
        ));
    }

    #[test]
    fn rejects_bad_percent_encoding() {
        assert!(matches!(
            from_delta("", "+%GG"),
            Err(DeltaSyntaxError::BadEncoding(_))
        ));
        assert!(matches!(
            from_delta("", "+%F"),
            Err(DeltaSyntaxError::BadEncoding(_))
        ));
    }
}
