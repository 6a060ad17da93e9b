// List and item envelopes.
//
// The `/usuarios` family wraps payloads as `{ "success": .., "data": .. }`
// while older endpoints (`/usuario`, most of `/parking`) return them bare.
// Both are accepted everywhere so callers never branch on the shape.

use serde_json::Value;

/// Extract the list from either `[...]` or `{ "data": [...] }`.
///
/// Anything else (an error object, `null`, a wrapped non-list) yields an
/// empty list.
pub fn normalize_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Unwrap `{ "data": x }` to `x`; any other value is returned unchanged.
pub fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
