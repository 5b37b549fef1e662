//! Dotted-path reference resolution over raw request values.
//!
//! Validators and transformers receive the raw aggregated values alongside the
//! field they inspect, and refer to sibling fields with paths such as
//! `"address.city"` or `"items.0.sku"`.

use serde_json::Value;

/// Resolves a dot-delimited reference against raw values.
///
/// Object segments are looked up by key, array segments by decimal index.
/// Resolution stops with `None` as soon as a segment is missing or the current
/// value cannot be traversed (strings, numbers, booleans and `null`). A `null`
/// stored at the final segment is returned as `Some(&Value::Null)`.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use trellis_core::resolve_ref;
///
/// let body = json!({ "ref3": { "ref4": "here" } });
/// assert_eq!(resolve_ref("ref3.ref4", &body), Some(&json!("here")));
/// assert_eq!(resolve_ref("ref5.ref6", &body), None);
/// ```
pub fn resolve_ref<'a>(reference: &str, raw_values: &'a Value) -> Option<&'a Value> {
    reference
        .split('.')
        .try_fold(raw_values, |current, segment| step(current, segment))
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => parse_index(segment).and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Accepts only canonical indices: `"0"`, `"12"`, never `"01"`, `"+1"` or `" 1"`.
fn parse_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}
