//! [`JSON_CANONICALIZATION_SCHEME`](https://identity.foundation/sidetree/spec/v1.0.0/#json-canonicalization-scheme)
//!
//! RFC 8785 (JCS) serialization. Every hash and commitment produced by this
//! crate is computed over the output of [`canonicalize`].
//!
//! Absent values (`None` fields marked `skip_serializing_if`) never reach the
//! serializer, which is how object members that are "undefined" get dropped.

use serde::Serialize;
use serde_json::Value;

use crate::Result;

pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(canonicalize_as_string(value)?.into_bytes())
}

pub fn canonicalize_as_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = String::new();
    write_value(&serde_json::to_value(value)?, &mut out)?;
    Ok(out)
}

/// `serde_jcs` formats strings and numbers, but its object members are
/// ordered by UTF-8 bytes. RFC 8785 §3.2.3 orders them by UTF-16 code units,
/// which differs once keys mix U+E000..U+FFFF with supplementary characters.
fn write_value(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value)> = map.iter().collect();
            members.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
            out.push('{');
            for (i, (key, member)) in members.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_jcs::to_string(key)?);
                out.push(':');
                write_value(member, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_jcs::to_string(scalar)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sorts_keys_and_strips_whitespace() {
        let value = json!({ "b": 1, "a": { "d": [3, 2, 1], "c": "x" } });
        assert_eq!(
            canonicalize_as_string(&value).unwrap(),
            r#"{"a":{"c":"x","d":[3,2,1]},"b":1}"#
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = json!({ "kty": "EC", "crv": "secp256k1", "x": "1", "y": "2" });
        let b = json!({ "y": "2", "x": "1", "crv": "secp256k1", "kty": "EC" });
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&a).unwrap());
    }

    #[test]
    fn skipped_fields_are_omitted() {
        #[derive(Serialize)]
        struct Entry {
            id: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            purposes: Option<Vec<&'static str>>,
        }

        let entry = Entry {
            id: "key1",
            purposes: None,
        };
        assert_eq!(canonicalize_as_string(&entry).unwrap(), r#"{"id":"key1"}"#);
    }

    #[test]
    fn keys_sort_by_utf16_code_units() {
        // U+1F600 is D83D DE00 in UTF-16, ahead of U+E000, though its UTF-8
        // bytes sort after.
        let value = json!({ "\u{e000}": 1, "\u{1F600}": 2 });
        assert_eq!(
            canonicalize_as_string(&value).unwrap(),
            "{\"\u{1F600}\":2,\"\u{e000}\":1}"
        );

        let nested = json!({ "service": { "\u{e000}": [{ "\u{1F600}": null, "a": true }] } });
        assert_eq!(
            canonicalize_as_string(&nested).unwrap(),
            "{\"service\":{\"\u{e000}\":[{\"a\":true,\"\u{1F600}\":null}]}}"
        );
    }

    #[test]
    fn numbers_and_strings() {
        let value = json!({ "n": 1.5, "i": 10, "s": "é\n" });
        assert_eq!(
            canonicalize_as_string(&value).unwrap(),
            "{\"i\":10,\"n\":1.5,\"s\":\"é\\n\"}"
        );
    }
}
