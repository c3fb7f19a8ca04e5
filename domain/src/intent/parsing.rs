//! Reading a classification back out of free-form model output.
//!
//! Models wrap their JSON in prose, code fences, or several candidate
//! objects. The first well-formed object carrying an `intent` key wins.

use super::entities::{Classification, Intent};
use serde_json::{Map, Value};

/// Parse model output into a classification.
///
/// Anything unusable (no JSON, no `intent` key, unknown intent name) yields
/// `ambiguous` with a reason describing what went wrong.
pub fn parse_classification(raw: &str) -> Classification {
    let Some(object) = first_intent_object(raw) else {
        return Classification::ambiguous("model output contained no intent object");
    };

    let name = match object.get("intent") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => {
            return Classification::ambiguous(format!("intent was not a string: {}", other));
        }
        None => return Classification::ambiguous("missing intent"),
    };

    let reasoning = object
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match name.parse::<Intent>() {
        Ok(intent) => Classification::new(intent, reasoning),
        Err(_) => Classification::ambiguous(format!("unknown intent '{}'", name)),
    }
}

/// Scan every `{` and try to deserialize one JSON value starting there.
fn first_intent_object(raw: &str) -> Option<Map<String, Value>> {
    raw.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| {
            let mut stream =
                serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Object(map))) if map.contains_key("intent") => Some(map),
                _ => None,
            }
        })
}
