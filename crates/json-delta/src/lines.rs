//! Newline-framed JSON serialization of lists for line-mode text diffing.

use serde_json::Value;

use crate::error::DeltaError;

/// Serialize each element as JSON followed by a newline. JSON string
/// escaping keeps every record on a single line, so the framing is total.
pub fn serialize_list(items: &[Value]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item).unwrap_or_default());
        out.push('\n');
    }
    out
}

/// Parse newline-framed JSON records back into a list, skipping empty
/// lines.
pub fn deserialize_list(text: &str) -> Result<Vec<Value>, DeltaError> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line)
            .map_err(|e| DeltaError::InvalidDelta(format!("bad list record: {e}")))?;
        out.push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_record_per_line() {
        let items = vec![json!(1), json!("two"), json!({"three": [3]})];
        let text = serialize_list(&items);
        assert_eq!(text, "1\n\"two\"\n{\"three\":[3]}\n");
        assert_eq!(deserialize_list(&text).unwrap(), items);
    }

    #[test]
    fn embedded_newlines_stay_escaped() {
        let items = vec![json!("a\nb"), json!(["c\nd"])];
        let text = serialize_list(&items);
        assert_eq!(text.matches('\n').count(), 2);
        assert_eq!(deserialize_list(&text).unwrap(), items);
    }

    #[test]
    fn empty_list_roundtrips() {
        assert_eq!(serialize_list(&[]), "");
        assert_eq!(deserialize_list("").unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn bad_records_are_errors() {
        assert!(deserialize_list("{broken\n").is_err());
    }
}
