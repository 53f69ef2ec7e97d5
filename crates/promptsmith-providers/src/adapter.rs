use promptsmith_core::{Error, HttpRequest, Provider, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::anthropic::AnthropicAdapter;
use crate::google::GoogleAdapter;
use crate::openai::OpenAiAdapter;

/// Everything an adapter needs to build one vendor request.
#[derive(Debug, Clone, Copy)]
pub struct ProviderCall<'call> {
    /// Finished instruction text.
    pub instruction: &'call str,
    /// Vendor credential.
    pub api_key: &'call str,
    /// Vendor model identifier.
    pub model: &'call str,
    /// Output-token cap.
    pub max_tokens: u32,
}

/// Vendor-specific wire shape.
pub trait ProviderAdapter: Send + Sync {
    /// Vendor this adapter speaks to.
    fn provider(&self) -> Provider;

    /// Builds the HTTP request for `call` against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or body cannot be built.
    fn build_request(&self, call: &ProviderCall<'_>, base_url: &str) -> Result<HttpRequest>;

    /// Pulls the generated text out of a successful response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] if the body lacks the text path.
    fn extract_text(&self, body: Value) -> Result<String>;
}

/// One adapter per provider. Adding a vendor is one entry here.
pub static ADAPTERS: [&dyn ProviderAdapter; 3] = [&AnthropicAdapter, &OpenAiAdapter, &GoogleAdapter];

/// Adapter registered for `provider`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedProvider`] if the table has no entry.
pub fn adapter_for(provider: Provider) -> Result<&'static dyn ProviderAdapter> {
    ADAPTERS
        .iter()
        .copied()
        .find(|adapter| adapter.provider() == provider)
        .ok_or_else(|| Error::UnsupportedProvider(provider.to_string()))
}

/// `{role: "user", content}` as used by the chat-style vendors.
#[derive(Debug, Serialize)]
pub(crate) struct UserMessage<'call> {
    /// Always `user`.
    pub role: &'static str,
    /// Instruction text.
    pub content: &'call str,
}

impl<'call> UserMessage<'call> {
    /// Wraps `content` as a user turn.
    pub(crate) const fn new(content: &'call str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

/// `{model, max_tokens, messages}` shared by Anthropic and `OpenAI`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'call> {
    /// Model identifier.
    pub model: &'call str,
    /// Output-token cap.
    pub max_tokens: u32,
    /// Single user turn.
    pub messages: [UserMessage<'call>; 1],
}

impl<'call> ChatRequest<'call> {
    /// Builds the single-turn body for `call`.
    pub(crate) const fn from_call(call: &ProviderCall<'call>) -> Self {
        Self {
            model: call.model,
            max_tokens: call.max_tokens,
            messages: [UserMessage::new(call.instruction)],
        }
    }
}

/// Decodes a response body into the adapter's expected shape.
pub(crate) fn decode_shape<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|err| Error::InvalidResponse(err.to_string()))
}

/// Treats a missing text path as an invalid response.
pub(crate) fn require_text(text: Option<String>, path: &str) -> Result<String> {
    text.ok_or_else(|| Error::InvalidResponse(format!("missing {path}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_provider_has_an_adapter() {
        for provider in Provider::ALL {
            assert_eq!(adapter_for(provider).unwrap().provider(), provider);
        }
    }

    #[test]
    fn test_table_has_no_duplicates() {
        for (index, adapter) in ADAPTERS.iter().enumerate() {
            assert!(
                ADAPTERS
                    .iter()
                    .skip(index + 1)
                    .all(|other| other.provider() != adapter.provider())
            );
        }
    }

    #[test]
    fn test_decode_shape_error_is_invalid_response() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code, reason = "only the decode failure matters")]
            text: String,
        }

        let err = decode_shape::<Expected>(serde_json::json!({"other": 1})).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
