//! Canonical JSON encoding.
//!
//! The canonical form is the sole input to hashing and signing:
//! - object keys sorted by UTF-8 byte order at every depth
//! - arrays keep their order
//! - no insignificant whitespace
//! - strings use standard JSON escapes, non-ASCII written verbatim
//! - integers in plain decimal, floats in shortest round-trip form
//!
//! Two structurally equal values always encode to identical bytes.

use serde::Serialize;
use serde_json::Value;

/// Errors from canonical encoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("value cannot be represented as JSON: {0}")]
    Serialization(String),
}

/// Encode any serializable value to canonical JSON bytes.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let value =
        serde_json::to_value(value).map_err(|e| CanonicalError::Serialization(e.to_string()))?;
    Ok(canonicalize_value(&value))
}

/// Encode a JSON value to canonical bytes. Infallible.
pub fn canonicalize_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value);
    buf
}

/// Canonical encoding as a `String`.
pub fn canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalError> {
    let bytes = canonicalize(value)?;
    // Only valid UTF-8 is ever written.
    String::from_utf8(bytes).map_err(|e| CanonicalError::Serialization(e.to_string()))
}

fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => buf.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(buf, s),
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(buf, item);
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            // serde_json's map order depends on crate features; sort explicitly.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            buf.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_string(buf, key);
                buf.push(b':');
                write_value(buf, item);
            }
            buf.push(b'}');
        }
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '\u{08}' => buf.extend_from_slice(b"\\b"),
            '\u{0c}' => buf.extend_from_slice(b"\\f"),
            c if (c as u32) < 0x20 => {
                buf.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn canon(value: &Value) -> String {
        String::from_utf8(canonicalize_value(value)).unwrap()
    }

    #[test]
    fn keys_are_sorted_at_every_level() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [ {"y": true, "x": null} ]});
        assert_eq!(
            canon(&value),
            r#"{"a":[{"x":null,"y":true}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn arrays_keep_order() {
        assert_eq!(canon(&json!([3, 1, 2])), "[3,1,2]");
    }

    #[test]
    fn numbers_are_platform_independent() {
        assert_eq!(canon(&json!(0.5)), "0.5");
        assert_eq!(canon(&json!(-12)), "-12");
        assert_eq!(canon(&json!(1.0)), "1.0");
        assert_eq!(canon(&json!(u64::MAX)), "18446744073709551615");
    }

    #[test]
    fn strings_match_standard_json_escaping() {
        let value = json!("quote\" slash\\ nl\n tab\t bell\u{07} é");
        let expected = serde_json::to_string(&value).unwrap();
        assert_eq!(canon(&value), expected);
    }

    #[test]
    fn typed_values_encode_like_their_json() {
        #[derive(serde::Serialize)]
        struct Sample {
            zeta: u8,
            alpha: &'static str,
        }
        let s = canonical_string(&Sample { zeta: 1, alpha: "x" }).unwrap();
        assert_eq!(s, r#"{"alpha":"x","zeta":1}"#);
    }

    #[test]
    fn non_string_map_keys_are_rejected() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], 1u8);
        assert!(canonicalize(&map).is_err());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z\u{e9}\"\\\\ ]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,4}", inner), 0..6).prop_map(|pairs| {
                    Value::Object(pairs.into_iter().collect())
                }),
            ]
        })
    }

    /// Rebuild every object with its keys inserted in reverse order.
    fn reorder(value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(reorder).collect()),
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map.iter().rev() {
                    out.insert(k.clone(), reorder(v));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    proptest! {
        #[test]
        fn key_order_never_changes_output(value in arb_json()) {
            prop_assert_eq!(canonicalize_value(&value), canonicalize_value(&reorder(&value)));
        }

        #[test]
        fn canonical_output_is_valid_json(value in arb_json()) {
            let bytes = canonicalize_value(&value);
            let parsed: Value = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
