//! JSON object extraction from free-form completion text.

use serde_json::Value;

use clinsim_contracts::error::{ClinsimError, ClinsimResult};

/// Pull the JSON object out of a completion response.
///
/// Takes the substring from the first `{` to the last `}` and parses it.
/// Leading prose, trailing prose and markdown fences around the object are
/// therefore ignored.
///
/// Returns `ClinsimError::ResponseParse` when either brace is missing, the
/// closing brace precedes the opening one, or the substring is not valid
/// JSON.
pub fn extract_json(text: &str) -> ClinsimResult<Value> {
    let block = json_block(text)?;
    serde_json::from_str(block).map_err(|e| ClinsimError::ResponseParse {
        reason: format!("invalid JSON in response: {}", e),
    })
}

fn json_block(text: &str) -> ClinsimResult<&str> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        (Some(_), Some(_)) => Err(ClinsimError::ResponseParse {
            reason: "closing brace precedes opening brace".to_string(),
        }),
        _ => Err(ClinsimError::ResponseParse {
            reason: "no JSON object found in response".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse_reason(text: &str) -> String {
        match extract_json(text) {
            Err(ClinsimError::ResponseParse { reason }) => reason,
            other => panic!("expected ResponseParse, got {other:?}"),
        }
    }

    #[test]
    fn bare_object() {
        assert_eq!(extract_json(r#"{"a": 1}"#).unwrap(), json!({ "a": 1 }));
    }

    #[test]
    fn leading_prose_is_ignored() {
        let text = "Sure! Here is the case you asked for:\n{\"diagnosis\": \"Migraine\"}";
        assert_eq!(extract_json(text).unwrap()["diagnosis"], "Migraine");
    }

    #[test]
    fn trailing_prose_is_ignored() {
        let text = "{\"diagnosis\": \"Migraine\"}\nLet me know if you need another.";
        assert_eq!(extract_json(text).unwrap()["diagnosis"], "Migraine");
    }

    #[test]
    fn fenced_block_is_unwrapped() {
        let text = "```json\n{\"diagnosis\": \"Migraine\", \"nested\": {\"k\": [1, 2]}}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["nested"]["k"], json!([1, 2]));
    }

    #[test]
    fn missing_braces_fail() {
        let reason = parse_reason("I cannot generate that case.");
        assert!(reason.contains("no JSON object"), "got: {reason}");

        let reason = parse_reason("only an opening { here");
        assert!(reason.contains("no JSON object"), "got: {reason}");
    }

    #[test]
    fn inverted_braces_fail() {
        let reason = parse_reason("} nothing useful {");
        assert!(reason.contains("closing brace"), "got: {reason}");
    }

    #[test]
    fn invalid_json_between_braces_fails() {
        let reason = parse_reason("{ diagnosis: Migraine }");
        assert!(reason.contains("invalid JSON"), "got: {reason}");
    }
}
