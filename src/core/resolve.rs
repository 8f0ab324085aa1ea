//! Dotted-path key resolution.
//!
//! Pure traversal over the merged table; the only failure mode is "not
//! found".

use serde_json::Value;

use crate::core::table::TableMap;

/// Resolve a dot-delimited key path, one segment at a time.
///
/// Returns the value at the final segment, or `None` when any intermediate
/// segment is absent or not a traversable mapping.
pub fn resolve_key<'t>(entries: &'t TableMap, key: &str) -> Option<&'t Value> {
    let mut segments = key.split('.');
    let mut current = entries.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Project a resolved leaf into annotation display text.
///
/// Mappings and arrays don't render inline; `null` has nothing to show.
pub fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
