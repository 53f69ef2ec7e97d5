use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::Result;

/// A JSON `POST` ready to be sent to a vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Absolute URL including any query string.
    pub url: String,
    /// Headers beyond `content-type`, in insertion order.
    pub headers: Vec<(String, String)>,
    /// JSON request body.
    pub body: Value,
}

impl HttpRequest {
    /// Creates a request with no extra headers.
    pub fn new<T: Into<String>>(url: T, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a vendor response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text, undecoded.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response from a status and body.
    pub fn new<T: Into<String>>(status: u16, body: T) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase, empty for unregistered codes.
    pub fn reason(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default()
    }
}

/// Sends prepared vendor requests.
///
/// Implementations perform exactly one attempt per call and apply no timeout
/// of their own.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Posts `request` and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received.
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse>;
}
