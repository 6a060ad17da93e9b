use serde_json::Value;

/// The user-facing message carried by a backend error body, if any.
///
/// Looks at `message` first and then `data.message`. Blank strings count as
/// absent so callers fall back to their own generic text.
pub fn backend_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("data").and_then(|d| d.get("message")))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
