use serde_json::Value;

/// Unwraps the conventional MCP tool-result shape
/// `{"content": [{"type": "text", "text": "<json>"}]}` down to the JSON
/// document embedded in the text block. Results that do not match the
/// shape, or whose text is not a JSON document, are returned as-is.
pub fn unwrap_text_content(result: &Value) -> Value {
    let text = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
        .and_then(|item| item.get("text"))
        .and_then(Value::as_str);

    if let Some(text) = text {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str(trimmed) {
                return parsed;
            }
        }
    }
    result.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_json_embedded_in_text_content() {
        let result = json!({
            "content": [{"type": "text", "text": "{\"hits\": 3}"}]
        });
        assert_eq!(unwrap_text_content(&result), json!({"hits": 3}));
    }

    #[test]
    fn leaves_plain_text_content_untouched() {
        let result = json!({
            "content": [{"type": "text", "text": "3 lines matched"}]
        });
        assert_eq!(unwrap_text_content(&result), result);
    }

    #[test]
    fn leaves_non_text_content_untouched() {
        let result = json!({
            "content": [{"type": "image", "data": "..."}]
        });
        assert_eq!(unwrap_text_content(&result), result);
    }

    #[test]
    fn leaves_unshaped_results_untouched() {
        let result = json!({"ok": true});
        assert_eq!(unwrap_text_content(&result), result);
    }

    #[test]
    fn invalid_embedded_json_falls_back_to_raw_result() {
        let result = json!({
            "content": [{"type": "text", "text": "{broken"}]
        });
        assert_eq!(unwrap_text_content(&result), result);
    }
}
