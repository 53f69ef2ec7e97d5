use async_trait::async_trait;
use promptsmith_core::{HttpRequest, HttpResponse, HttpTransport, Result};
use reqwest::{Client, Error as ReqwestError};

/// Production transport over a shared `reqwest` client.
///
/// No timeout is configured; callers that need one wrap the call.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    /// Pooled HTTP client.
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .post(&request.url)
            .header("content-type", "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // Google carries the key in the query string, so errors drop the URL.
        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(ReqwestError::without_url)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(ReqwestError::without_url)?;

        Ok(HttpResponse { status, body })
    }
}
