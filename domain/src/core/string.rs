//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Lower-case and collapse all runs of whitespace into single spaces.
pub fn normalize_prompt(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for `None`, blank strings, empty arrays/objects, `false`, and `0`.
///
/// Mirrors "falsy" for loosely typed provider payloads.
pub fn is_falsy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes
        assert_eq!(truncate("café au lait", 30), "café au lait");
        assert_eq!(truncate("ééééé", 7), "éé...");
    }

    #[test]
    fn test_normalize_prompt() {
        assert_eq!(normalize_prompt("  Show ME\tthe   Jira\n tickets "), "show me the jira tickets");
        assert_eq!(normalize_prompt(""), "");
    }

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!("  ")));
        assert!(is_falsy(&json!([])));
        assert!(is_falsy(&json!({})));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(!is_falsy(&json!("x")));
        assert!(!is_falsy(&json!([1])));
        assert!(!is_falsy(&json!(true)));
    }
}
