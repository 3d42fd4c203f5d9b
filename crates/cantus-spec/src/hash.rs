//! Canonical hashing and seed derivation.
//!
//! - Canonical JSON per RFC 8785 (JCS)
//! - BLAKE3 hashes of canonical JSON, used to compare compositions
//! - Per-stage seed derivation so every stage draws from an independent stream

use serde::Serialize;

/// Computes the canonical BLAKE3 hash of any serializable value.
///
/// ```text
/// hash = hex(BLAKE3(JCS(value_json)))
/// ```
///
/// # Returns
/// * A 64-character lowercase hexadecimal string
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    Ok(canonical_value_hash(&value))
}

/// Computes the canonical BLAKE3 hash of a JSON value.
pub fn canonical_value_hash(value: &serde_json::Value) -> String {
    let canonical = canonicalize_json(value);
    blake3_hash(canonical.as_bytes())
}

/// Canonicalizes a JSON value according to RFC 8785 (JCS).
///
/// - Object keys are sorted lexicographically
/// - No whitespace between tokens
/// - Integral floats are written without a fraction
/// - Strings use minimal escaping
pub fn canonicalize_json(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Null => out.push_str("null"),
        serde_json::Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        serde_json::Value::Number(n) => out.push_str(&format_jcs_number(n)),
        serde_json::Value::String(s) => write_jcs_string(s, out),
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        serde_json::Value::Object(obj) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = obj.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_jcs_string(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

fn format_jcs_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => {
            if f == 0.0 {
                "0".to_string()
            } else if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", f as i64)
            } else {
                format!("{}", f)
            }
        }
        _ => "null".to_string(),
    }
}

fn write_jcs_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c < '\x20' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Derives the seed for one stage (and one index within it, e.g. a section).
///
/// ```text
/// stage_seed = truncate_u64(BLAKE3(seed || stage || index))
/// ```
///
/// # Example
/// ```
/// use cantus_spec::hash::derive_stage_seed;
///
/// let harmony = derive_stage_seed(42, "harmony", 0);
/// let melody = derive_stage_seed(42, "melody", 0);
/// assert_ne!(harmony, melody);
/// assert_eq!(harmony, derive_stage_seed(42, "harmony", 0));
/// ```
pub fn derive_stage_seed(seed: u64, stage: &str, index: u32) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(stage.as_bytes());
    hasher.update(&[0]);
    hasher.update(&index.to_le_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Computes a BLAKE3 hash of arbitrary data as lowercase hex.
pub fn blake3_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_key_order() {
        let value = json!({"b": 1, "a": [true, null, "x"], "c": {"z": 0.5, "y": 2.0}});
        assert_eq!(
            canonicalize_json(&value),
            r#"{"a":[true,null,"x"],"b":1,"c":{"y":2,"z":0.5}}"#
        );
    }

    #[test]
    fn test_string_escaping() {
        let value = json!("line\nbreak \"quoted\" \u{01}");
        assert_eq!(
            canonicalize_json(&value),
            r#""line\nbreak \"quoted\" \u0001""#
        );
    }

    #[test]
    fn test_hash_is_order_independent() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 2, "x": 1});
        assert_eq!(canonical_value_hash(&a), canonical_value_hash(&b));
        assert_eq!(canonical_value_hash(&a).len(), 64);
    }

    #[test]
    fn test_stage_seeds_are_independent() {
        let base = derive_stage_seed(7, "melody", 0);
        assert_ne!(base, derive_stage_seed(7, "melody", 1));
        assert_ne!(base, derive_stage_seed(8, "melody", 0));
        assert_ne!(base, derive_stage_seed(7, "bass", 0));
        assert_eq!(base, derive_stage_seed(7, "melody", 0));
    }

    #[test]
    fn test_stage_name_is_delimited() {
        assert_ne!(
            derive_stage_seed(1, "ab", 0),
            derive_stage_seed(1, "a", u32::from_le_bytes([b'b', 0, 0, 0]))
        );
    }
}
