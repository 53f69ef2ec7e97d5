//! Mock transport for testing dispatch without real API calls.
//!
//! Replies are queued up front and handed out in order; every request is
//! recorded so tests can assert on the exact wire shape, or on the absence
//! of any call at all.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use promptsmith_core::{
    Error, HttpRequest, HttpResponse, HttpTransport, IgnoreLock as _, Result,
};
use serde_json::Value;

/// A queued outcome.
#[derive(Debug, Clone)]
enum MockReply {
    /// A response with this status and body.
    Response(HttpResponse),
    /// A transport failure with this message.
    Failure(String),
}

/// Transport that replays canned replies and records requests.
///
/// Clones share state, so a test can keep one handle and give another to
/// the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Pending replies, oldest first.
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Every request received.
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Creates a transport with no queued replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a raw body.
    #[must_use]
    pub fn with_response(self, status: u16, body: impl Into<String>) -> Self {
        self.push(MockReply::Response(HttpResponse::new(status, body)));
        self
    }

    /// Queues a response with a JSON body.
    #[must_use]
    pub fn with_json(self, status: u16, body: &Value) -> Self {
        self.with_response(status, body.to_string())
    }

    /// Queues a transport failure.
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Failure(message.into()));
        self
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock_ignore_poison().clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock_ignore_poison().last().cloned()
    }

    /// Number of requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock_ignore_poison().len()
    }

    fn push(&self, reply: MockReply) {
        self.replies.lock_ignore_poison().push_back(reply);
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock_ignore_poison().push(request);

        let reply = self.replies.lock_ignore_poison().pop_front();
        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(message)) => Err(Error::Transport(message)),
            None => Err(Error::Transport("no mock reply queued".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let mock = MockTransport::new()
            .with_response(200, "first")
            .with_failure("down");
        let request = HttpRequest::new("http://mock.test", json!({"n": 1}));

        let first = mock.post_json(request.clone()).await.unwrap();
        assert_eq!(first.body, "first");

        let second = mock.post_json(request.clone()).await.unwrap_err();
        assert_eq!(second.to_string(), "down");

        let third = mock.post_json(request).await.unwrap_err();
        assert_eq!(third.to_string(), "no mock reply queued");

        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.requests()[0].body, json!({"n": 1}));
    }

    #[test]
    fn test_clones_share_state() {
        let mock = MockTransport::new();
        let handle = mock.clone().with_response(200, "shared");
        assert_eq!(handle.replies.lock_ignore_poison().len(), 1);
        assert_eq!(mock.replies.lock_ignore_poison().len(), 1);
    }
}
