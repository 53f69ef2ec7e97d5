//! Google Generative Language adapter.
//!
//! Differs from the chat-style vendors in two ways: the API key travels in
//! the URL query rather than a header, and the model is part of the path.

use promptsmith_core::{Error, HttpRequest, Provider, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::{ProviderAdapter, ProviderCall, decode_shape, require_text};

/// Google Generative Language API.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleAdapter;

impl ProviderAdapter for GoogleAdapter {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn build_request(&self, call: &ProviderCall<'_>, base_url: &str) -> Result<HttpRequest> {
        let raw = format!("{base_url}/v1beta/models/{}:generateContent", call.model);
        let mut url = Url::parse(&raw)
            .map_err(|err| Error::Config(format!("Invalid Google endpoint {raw}: {err}")))?;
        url.query_pairs_mut().append_pair("key", call.api_key);

        let body = serde_json::to_value(GenerateRequest {
            contents: [Content {
                parts: [Part {
                    text: call.instruction,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: call.max_tokens,
            },
        })?;
        Ok(HttpRequest::new(url.as_str(), body))
    }

    fn extract_text(&self, body: Value) -> Result<String> {
        let response: GenerateResponse = decode_shape(body)?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text);
        require_text(text, "candidates[0].content.parts[0].text")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'call> {
    contents: [Content<'call>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'call> {
    parts: [Part<'call>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'call> {
    text: &'call str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
