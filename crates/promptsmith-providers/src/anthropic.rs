use promptsmith_core::{HttpRequest, Provider, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{ChatRequest, ProviderAdapter, ProviderCall, decode_shape, require_text};

/// Messages endpoint path.
const MESSAGES_PATH: &str = "/v1/messages";
/// Pinned API version header value.
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicAdapter;

impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn build_request(&self, call: &ProviderCall<'_>, base_url: &str) -> Result<HttpRequest> {
        let body = serde_json::to_value(ChatRequest::from_call(call))?;
        Ok(HttpRequest::new(format!("{base_url}{MESSAGES_PATH}"), body)
            .with_header("x-api-key", call.api_key)
            .with_header("anthropic-version", API_VERSION))
    }

    fn extract_text(&self, body: Value) -> Result<String> {
        let response: MessagesResponse = decode_shape(body)?;
        let text = response.content.into_iter().next().and_then(|block| block.text);
        require_text(text, "content[0].text")
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptsmith_core::Error;
    use serde_json::json;

    fn call() -> ProviderCall<'static> {
        ProviderCall {
            instruction: "Improve: hi",
            api_key: "sk-ant",
            model: "claude-3-5-haiku-20241022",
            max_tokens: 1500,
        }
    }

    #[test]
    fn test_request_shape() {
        let request = AnthropicAdapter
            .build_request(&call(), "https://api.anthropic.com")
            .unwrap();

        assert_eq!(request.url, "https://api.anthropic.com/v1/messages");
        assert_eq!(request.header("x-api-key"), Some("sk-ant"));
        assert_eq!(request.header("anthropic-version"), Some("2023-06-01"));
        assert_eq!(request.header("authorization"), None);
        assert_eq!(
            request.body,
            json!({
                "model": "claude-3-5-haiku-20241022",
                "max_tokens": 1500,
                "messages": [{"role": "user", "content": "Improve: hi"}]
            })
        );
    }

    #[test]
    fn test_extracts_first_block() {
        let body = json!({
            "id": "msg_1",
            "type": "message",
            "content": [{"type": "text", "text": "IMPROVED"}, {"type": "text", "text": "ignored"}],
            "usage": {"input_tokens": 10, "output_tokens": 3}
        });
        assert_eq!(AnthropicAdapter.extract_text(body).unwrap(), "IMPROVED");
    }

    #[test]
    fn test_missing_content_is_invalid() {
        let err = AnthropicAdapter.extract_text(json!({"content": []})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid response from provider: missing content[0].text"
        );

        let err = AnthropicAdapter
            .extract_text(json!({"content": "not a list"}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
