// Artifact assemblers - thin consumers of the LLM gateway. Each builds a
// fixed prompt from collected answers, coerces the reply shape, and (where
// the contract allows) degrades to a deterministic placeholder.

pub mod concept;
pub mod followup;
pub mod mockup;
pub mod summary;

use serde_json::Value;

/// Placeholder used whenever a reply field is missing or wrong-typed
pub const FIELD_PLACEHOLDER: &str = "—";

/// Pull a trimmed string field out of a reply object, degrading to the
/// placeholder instead of failing
pub(crate) fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FIELD_PLACEHOLDER)
        .to_string()
}

/// Trimmed input, or the placeholder when the caller left it empty
pub(crate) fn or_placeholder(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        FIELD_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_field_coercion() {
        let value = json!({"a": "  hello  ", "b": 42, "c": ""});
        assert_eq!(str_field(&value, "a"), "hello");
        assert_eq!(str_field(&value, "b"), FIELD_PLACEHOLDER);
        assert_eq!(str_field(&value, "c"), FIELD_PLACEHOLDER);
        assert_eq!(str_field(&value, "missing"), FIELD_PLACEHOLDER);
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder("  x "), "x");
        assert_eq!(or_placeholder("   "), FIELD_PLACEHOLDER);
    }
}
