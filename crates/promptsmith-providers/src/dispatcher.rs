use std::sync::Arc;

use promptsmith_core::{
    DEFAULT_MAX_TOKENS, Endpoints, Error, HttpResponse, HttpTransport, Provider, Result,
};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{ProviderCall, adapter_for};

/// Routes finished instructions to the right vendor.
///
/// Holds no per-call state; one dispatcher can serve any number of
/// concurrent calls.
pub struct Dispatcher {
    /// Sends the prepared requests.
    transport: Arc<dyn HttpTransport>,
    /// Vendor base URLs.
    endpoints: Endpoints,
    /// Output-token cap sent with every request.
    max_tokens: u32,
}

impl Dispatcher {
    /// Creates a dispatcher against the public vendor endpoints.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            endpoints: Endpoints::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Overrides the vendor base URLs.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Overrides the output-token cap.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Output-token cap in effect.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Sends `instruction` to `provider` and returns the generated text.
    ///
    /// Makes exactly one request and never retries.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no response arrives, an API or HTTP error
    /// for non-2xx statuses, a JSON error for malformed bodies, and
    /// [`Error::InvalidResponse`] for bodies without the expected text.
    pub async fn dispatch(
        &self,
        provider: Provider,
        instruction: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String> {
        let adapter = adapter_for(provider)?;
        let call = ProviderCall {
            instruction,
            api_key,
            model,
            max_tokens: self.max_tokens,
        };
        let request = adapter.build_request(&call, self.endpoints.base_for(provider))?;

        tracing::debug!(
            %provider,
            model,
            host = %host_of(&request.url),
            max_tokens = self.max_tokens,
            "dispatching instruction"
        );

        let response = self.transport.post_json(request).await?;
        if !response.is_success() {
            let err = status_failure(&response);
            tracing::warn!(%provider, status = response.status, "provider returned {err}");
            return Err(err);
        }

        let body: Value = serde_json::from_str(&response.body)?;
        adapter.extract_text(body)
    }

    /// Same as [`Dispatcher::dispatch`] with the provider given by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedProvider`] before any I/O for unknown
    /// names, otherwise whatever [`Dispatcher::dispatch`] returns.
    pub async fn dispatch_named(
        &self,
        provider: &str,
        instruction: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String> {
        let provider: Provider = provider.parse()?;
        self.dispatch(provider, instruction, api_key, model).await
    }
}

/// `{ "error": { "message": ... } }`, the shape all three vendors use.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Maps a non-2xx response to the message the user sees.
///
/// Uses `error.message` from the body when there is one, otherwise
/// `HTTP <status>: <reason>`.
fn status_failure(response: &HttpResponse) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(&response.body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .filter(|message| !message.is_empty());

    match message {
        Some(message) => Error::Api {
            status: response.status,
            message,
        },
        None => Error::Http {
            status: response.status,
            reason: response.reason().to_owned(),
        },
    }
}

/// Host part of `url`, so logs never carry a query-string key.
fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_default()
}
