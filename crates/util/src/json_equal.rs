use serde_json::Value;

/// Performs a deep equality check between two JSON values using the delta
/// engine's comparison rules.
///
/// Values compare structurally:
/// - Primitives (null, bool, string) by value.
/// - Numbers by their `f64` projection, so `1` and `1.0` are equal.
/// - Booleans against numbers by numeric projection (`false` = 0, `true` = 1).
/// - Arrays element by element, objects key by key.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_delta_util::json_equal::deep_equal;
///
/// assert!(deep_equal(&json!({"n": [1, 2]}), &json!({"n": [1.0, 2.0]})));
/// assert!(deep_equal(&json!(true), &json!(1)));
/// assert!(!deep_equal(&json!(true), &json!(2)));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,

        // Booleans project onto 0/1 when compared against numbers.
        (Value::Bool(flag), Value::Number(n)) | (Value::Number(n), Value::Bool(flag)) => {
            n.as_f64() == Some(if *flag { 1.0 } else { 0.0 })
        }

        (Value::Array(arr_a), Value::Array(arr_b)) => {
            if arr_a.len() != arr_b.len() {
                return false;
            }
            for i in 0..arr_a.len() {
                if !deep_equal(&arr_a[i], &arr_b[i]) {
                    return false;
                }
            }
            true
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            for (key, val_a) in obj_a {
                match obj_b.get(key) {
                    Some(val_b) => {
                        if !deep_equal(val_a, val_b) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            true
        }

        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_numbers() {
        assert!(deep_equal(&json!(1), &json!(1)));
        assert!(deep_equal(&json!(1), &json!(1.0)));
    }

    #[test]
    fn not_equal_numbers() {
        assert!(!deep_equal(&json!(1), &json!(2)));
    }

    #[test]
    fn bool_number_coercion() {
        assert!(deep_equal(&json!(true), &json!(1)));
        assert!(deep_equal(&json!(false), &json!(0)));
        assert!(deep_equal(&json!(1), &json!(true)));
        assert!(!deep_equal(&json!(true), &json!(2)));
        assert!(!deep_equal(&json!(false), &json!(1)));
    }

    #[test]
    fn zero_and_null_not_equal() {
        assert!(!deep_equal(&json!(0), &json!(null)));
    }

    #[test]
    fn strings() {
        assert!(deep_equal(&json!("a"), &json!("a")));
        assert!(!deep_equal(&json!("a"), &json!("b")));
        assert!(!deep_equal(&json!(""), &json!(null)));
    }

    #[test]
    fn null_equal_null() {
        assert!(deep_equal(&json!(null), &json!(null)));
    }

    #[test]
    fn objects_ignore_key_order() {
        assert!(deep_equal(
            &json!({"a": 1, "b": "2"}),
            &json!({"b": "2", "a": 1})
        ));
    }

    #[test]
    fn objects_differ_by_extra_key() {
        assert!(!deep_equal(
            &json!({"a": 1}),
            &json!({"a": 1, "b": 2})
        ));
    }

    #[test]
    fn objects_differ_by_value() {
        assert!(!deep_equal(
            &json!({"a": 1, "b": 2}),
            &json!({"a": 1, "b": 3})
        ));
    }

    #[test]
    fn arrays() {
        assert!(deep_equal(&json!([1, 2, 3]), &json!([1, 2, 3])));
        assert!(!deep_equal(&json!([1, 2, 3]), &json!([1, 2, 4])));
        assert!(!deep_equal(&json!([1, 2, 3]), &json!([1, 2])));
    }

    #[test]
    fn array_with_coerced_elements() {
        assert!(deep_equal(&json!([true, 0]), &json!([1, false])));
    }

    #[test]
    fn empty_object_and_array_not_equal() {
        assert!(!deep_equal(&json!({}), &json!([])));
    }

    #[test]
    fn nested_structures() {
        assert!(deep_equal(
            &json!({"a": [{"b": "c"}, 2]}),
            &json!({"a": [{"b": "c"}, 2]})
        ));
        assert!(!deep_equal(
            &json!({"a": [{"b": "c"}]}),
            &json!({"a": [{"b": "d"}]})
        ));
    }
}
