//! Canonical JSON serialization and content digests.
//!
//! Two documents that differ only in formatting (whitespace, object key
//! order) MUST produce identical digests; any change to content MUST
//! change the digest.
//!
//! Algorithm:
//! 1. Serialize via RFC 8785 (JCS): sorted keys, no whitespace, canonical
//!    numbers, arrays in declared order
//! 2. digest = lowercase hex of SHA256(canonical bytes)

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical byte serialization of a JSON value.
///
/// Object keys sort lexicographically at every nesting level; array order
/// is semantic and preserved.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Null => b"null".to_vec(),
        Value::Bool(b) => {
            if *b {
                b"true".to_vec()
            } else {
                b"false".to_vec()
            }
        }
        Value::Number(n) => {
            // RFC 8785: canonical number formatting
            if let Some(i) = n.as_i64() {
                format!("{i}").into_bytes()
            } else if let Some(u) = n.as_u64() {
                format!("{u}").into_bytes()
            } else if let Some(f) = n.as_f64() {
                format!("{f}").into_bytes()
            } else {
                n.to_string().into_bytes()
            }
        }
        Value::String(_) => {
            // Standard JSON string escaping; serializing a string value
            // cannot fail.
            serde_json::to_vec(value).unwrap()
        }
        Value::Array(arr) => {
            let mut buf = Vec::new();
            buf.push(b'[');
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                buf.extend_from_slice(&canonical_bytes(v));
            }
            buf.push(b']');
            buf
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut buf = Vec::new();
            buf.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                let key_json = serde_json::to_vec(&Value::String((*key).clone())).unwrap();
                buf.extend_from_slice(&key_json);
                buf.push(b':');
                buf.extend_from_slice(&canonical_bytes(&map[*key]));
            }
            buf.push(b'}');
            buf
        }
    }
}

/// Lowercase SHA-256 hex digest of the canonical serialization.
pub fn digest_hex(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_bytes(value));
    format!("{:x}", hasher.finalize())
}

/// Whether `s` has the shape of a [`digest_hex`] output: exactly 64
/// lowercase hex characters.
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == 64
        && s.chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
