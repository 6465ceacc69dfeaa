//! Backend error flattening.
//!
//! The backend returns validation failures as nested objects and arrays,
//! e.g. `{"errors": {"firstName": "mustBeLonger"}}`. This module walks the
//! body depth-first and joins every leaf into one human-readable string,
//! turning camelCase and snake_case keys into readable words.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref CAMEL_BOUNDARY_RE: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
}

/// Turn a camelCase or snake_case identifier into a readable sentence
/// fragment: "firstName" becomes "First name".
fn camel_to_readable(text: &str) -> String {
    let spaced = CAMEL_BOUNDARY_RE.replace_all(text, "$1 $2");
    let lowered = spaced.replace('_', " ").to_lowercase();

    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => lowered,
    }
}

fn extract_messages(value: &Value, parent_key: Option<&str>, messages: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            let readable = camel_to_readable(s);
            match parent_key {
                Some(key) => messages.push(format!("{}: {}", camel_to_readable(key), readable)),
                None => messages.push(readable),
            }
        }
        Value::Array(items) => {
            for item in items {
                extract_messages(item, parent_key, messages);
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                extract_messages(nested, Some(key), messages);
            }
        }
        other => messages.push(other.to_string()),
    }
}

/// Flatten an arbitrary error body into a single readable string.
pub fn parse_error_to_string(error: &Value) -> String {
    let mut messages = Vec::new();
    extract_messages(error, None, &mut messages);
    messages.join(", ")
}

/// Flatten a raw response body. Non-JSON bodies pass through unchanged.
pub fn flatten_error_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            let flattened = parse_error_to_string(&value);
            if flattened.is_empty() {
                body.to_string()
            } else {
                flattened
            }
        }
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string() {
        assert_eq!(parse_error_to_string(&json!("notFound")), "Not found");
    }

    #[test]
    fn test_nested_object_keys_prefixed() {
        let body = json!({"errors": {"firstName": "mustBeLonger"}});
        assert_eq!(
            parse_error_to_string(&body),
            "First name: Must be longer"
        );
    }

    #[test]
    fn test_array_of_messages() {
        let body = json!({"email": ["alreadyExists", "invalidFormat"]});
        assert_eq!(
            parse_error_to_string(&body),
            "Email: Already exists, Email: Invalid format"
        );
    }

    #[test]
    fn test_snake_case_flattened() {
        assert_eq!(parse_error_to_string(&json!("not_enough_rights")), "Not enough rights");
    }

    #[test]
    fn test_numbers_stringified() {
        let body = json!({"code": 422});
        assert_eq!(parse_error_to_string(&body), "422");
    }

    #[test]
    fn test_non_json_body_passes_through() {
        assert_eq!(flatten_error_body("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(parse_error_to_string(&json!({})), "");
    }
}
