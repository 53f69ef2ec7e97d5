use std::sync::Arc;

use promptsmith_core::{
    ContextStyle, HttpTransport, OptimizationRequest, OptimizationResult, Provider, Result,
    Settings,
};

use crate::dispatcher::Dispatcher;

/// Turns an [`OptimizationRequest`] into an [`OptimizationResult`].
///
/// This is the only place errors are converted into `Failure`; nothing
/// escapes [`PromptOptimizer::optimize`] as an `Err`.
pub struct PromptOptimizer {
    /// Routes instructions to vendors.
    dispatcher: Dispatcher,
}

impl PromptOptimizer {
    /// Wraps an existing dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Builds an optimizer whose endpoints and token cap come from `settings`.
    pub fn from_settings(transport: Arc<dyn HttpTransport>, settings: &Settings) -> Self {
        Self::new(
            Dispatcher::new(transport)
                .with_endpoints(settings.endpoints.clone())
                .with_max_tokens(settings.effective_max_tokens()),
        )
    }

    /// Underlying dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs validation, template resolution, and dispatch.
    pub async fn optimize(&self, request: &OptimizationRequest) -> OptimizationResult {
        let result = self.try_optimize(request).await;
        match &result {
            Err(err) if err.is_validation() => tracing::debug!("request rejected: {err}"),
            Err(err) => tracing::info!(status = ?err.status(), "optimization failed: {err}"),
            Ok(_) => {}
        }
        result.into()
    }

    /// Like [`PromptOptimizer::optimize`] but keeps the typed error.
    ///
    /// # Errors
    ///
    /// Returns `MissingParameters` or `UnsupportedProvider` before any I/O,
    /// otherwise whatever the dispatcher returns.
    pub async fn try_optimize(&self, request: &OptimizationRequest) -> Result<String> {
        request.validate()?;
        let provider = Provider::resolve(request.provider.as_deref())?;
        let style = ContextStyle::resolve(request.context_style.as_deref());
        let instruction = style.render(&request.user_prompt);
        let model = request.model_for(provider);

        tracing::debug!(%provider, %style, model, "optimizing prompt");
        self.dispatcher
            .dispatch(provider, &instruction, &request.api_key, model)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use promptsmith_core::resolve_template;
    use serde_json::json;

    fn optimizer(mock: &MockTransport) -> PromptOptimizer {
        PromptOptimizer::new(Dispatcher::new(Arc::new(mock.clone())))
    }

    fn failure(message: &str) -> OptimizationResult {
        OptimizationResult::Failure {
            message: message.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_missing_prompt_makes_no_call() {
        let mock = MockTransport::new();
        let result = optimizer(&mock)
            .optimize(&OptimizationRequest::new("", "k"))
            .await;
        assert_eq!(result, failure("Missing required parameters"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let mock = MockTransport::new();
        let result = optimizer(&mock)
            .optimize(&OptimizationRequest::new("hi", ""))
            .await;
        assert_eq!(result, failure("Missing required parameters"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_provider_makes_no_call() {
        let mock = MockTransport::new();
        let request = OptimizationRequest::new("hi", "k").with_provider("unknown");
        let result = optimizer(&mock).optimize(&request).await;
        assert_eq!(result, failure("Unsupported provider: unknown"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_anthropic_success() {
        let mock = MockTransport::new().with_json(200, &json!({"content": [{"text": "IMPROVED"}]}));
        let request = OptimizationRequest::new("hi", "k").with_provider("anthropic");
        let result = optimizer(&mock).optimize(&request).await;

        assert_eq!(
            result,
            OptimizationResult::Success {
                optimized_text: "IMPROVED".to_owned()
            }
        );
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.body["model"], json!("claude-3-5-sonnet-20241022"));
        assert_eq!(
            sent.body["messages"][0]["content"],
            json!(resolve_template("comprehensive", "hi"))
        );
    }

    #[tokio::test]
    async fn test_rate_limit_message() {
        let mock =
            MockTransport::new().with_json(429, &json!({"error": {"message": "rate limited"}}));
        let result = optimizer(&mock)
            .optimize(&OptimizationRequest::new("hi", "k"))
            .await;
        assert_eq!(result, failure("rate limited"));
    }

    #[tokio::test]
    async fn test_server_error_status_line() {
        let mock = MockTransport::new().with_response(500, "upstream exploded");
        let result = optimizer(&mock)
            .optimize(&OptimizationRequest::new("hi", "k"))
            .await;
        assert_eq!(result, failure("HTTP 500: Internal Server Error"));
    }

    #[tokio::test]
    async fn test_unexpected_shape_becomes_failure() {
        let mock = MockTransport::new().with_json(200, &json!({"content": []}));
        let result = optimizer(&mock)
            .optimize(&OptimizationRequest::new("hi", "k"))
            .await;
        assert_eq!(
            result,
            failure("Invalid response from provider: missing content[0].text")
        );
    }

    #[tokio::test]
    async fn test_style_and_model_pass_through() {
        let mock = MockTransport::new().with_json(
            200,
            &json!({"candidates": [{"content": {"parts": [{"text": "IMPROVED"}]}}]}),
        );
        let request = OptimizationRequest::new("hi", "k")
            .with_provider("google")
            .with_model("gemini-2.0-flash")
            .with_context_style("creative");
        let text = optimizer(&mock).try_optimize(&request).await.unwrap();
        assert_eq!(text, "IMPROVED");

        let sent = mock.last_request().unwrap();
        assert!(sent.url.contains("/models/gemini-2.0-flash:generateContent?key=k"));
        assert_eq!(
            sent.body["contents"][0]["parts"][0]["text"],
            json!(resolve_template("creative", "hi"))
        );
    }

    #[tokio::test]
    async fn test_from_settings_applies_cap() {
        let mock = MockTransport::new().with_json(200, &json!({"content": [{"text": "ok"}]}));
        let mut settings = Settings::default();
        settings.set("maxTokens", "1000").unwrap();
        let optimizer = PromptOptimizer::from_settings(Arc::new(mock.clone()), &settings);
        assert_eq!(optimizer.dispatcher().max_tokens(), 1000);

        optimizer
            .optimize(&OptimizationRequest::new("hi", "k"))
            .await;
        assert_eq!(mock.last_request().unwrap().body["max_tokens"], json!(1000));
    }
}
