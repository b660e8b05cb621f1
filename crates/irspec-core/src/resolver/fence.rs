//! Markdown fence stripping and structured-text decoding.

use serde_json::Value;

const FENCE: &str = "```";

/// Strip a surrounding markdown code fence and whitespace.
///
/// Accepts an optional language hint after the opening fence (```` ```json ````,
/// ```` ```yaml ````). Text after the closing fence is dropped with it.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix(FENCE) {
        let hint_len = rest.find(|c: char| !is_hint_char(c)).unwrap_or(rest.len());
        let after_hint = &rest[hint_len..];
        let body = if after_hint.is_empty() || after_hint.starts_with(char::is_whitespace) {
            after_hint
        } else {
            rest
        };
        let body = match body.rfind(FENCE) {
            Some(end) => &body[..end],
            None => body,
        };
        return body.trim();
    }

    trimmed.strip_suffix(FENCE).unwrap_or(trimmed).trim()
}

fn is_hint_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')
}

/// Decode JSON, falling back to YAML.
///
/// Both land in a `serde_json::Value` so candidate shapes are tried against a
/// single document model.
pub(crate) fn decode_document(text: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(doc) => Ok(doc),
        Err(json_err) => serde_yaml::from_str::<Value>(text).map_err(|yaml_err| {
            format!("not valid JSON ({json_err}) or YAML ({yaml_err})")
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_bare_fence() {
        assert_eq!(strip_code_fence("  ```\n[1, 2]\n```  "), "[1, 2]");
    }

    #[test]
    fn test_strip_yaml_fence() {
        assert_eq!(strip_code_fence("```yaml\nname: x\n```"), "name: x");
    }

    #[test]
    fn test_unfenced_text_is_trimmed() {
        assert_eq!(strip_code_fence("\n  {\"a\": 1}  \n"), "{\"a\": 1}");
    }

    #[test]
    fn test_trailing_chatter_after_fence_is_dropped() {
        let text = "```json\n{\"a\": 1}\n```\nLet me know if you need more tests.";
        assert_eq!(strip_code_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn test_content_on_fence_line_is_kept() {
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```name: x\n```"), "name: x");
    }

    #[test]
    fn test_decode_json_then_yaml() {
        assert_eq!(decode_document("{\"a\": 1}").unwrap(), json!({"a": 1}));
        assert_eq!(
            decode_document("- name: t\n  setup:\n    a: 2\n").unwrap(),
            json!([{"name": "t", "setup": {"a": 2}}])
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_document("this is not valid yaml: [[[").is_err());
    }
}
