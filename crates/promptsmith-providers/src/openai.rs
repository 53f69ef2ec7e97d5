use promptsmith_core::{HttpRequest, Provider, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{ChatRequest, ProviderAdapter, ProviderCall, decode_shape, require_text};

/// Chat Completions endpoint path.
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// `OpenAI` Chat Completions API.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiAdapter;

impl ProviderAdapter for OpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn build_request(&self, call: &ProviderCall<'_>, base_url: &str) -> Result<HttpRequest> {
        let body = serde_json::to_value(ChatRequest::from_call(call))?;
        Ok(
            HttpRequest::new(format!("{base_url}{COMPLETIONS_PATH}"), body)
                .with_header("Authorization", format!("Bearer {}", call.api_key)),
        )
    }

    fn extract_text(&self, body: Value) -> Result<String> {
        let response: CompletionResponse = decode_shape(body)?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        require_text(text, "choices[0].message.content")
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
