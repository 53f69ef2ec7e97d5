//! Provider adapters, dispatch, and the optimize entry point.
//!
//! Each vendor gets a [`ProviderAdapter`] that builds its request and decodes
//! its response. The [`Dispatcher`] picks the adapter from a static table and
//! sends through an [`HttpTransport`](promptsmith_core::HttpTransport).
//! [`PromptOptimizer`] is the single place errors become results.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

/// Adapter trait and the static adapter table.
pub mod adapter;
/// Anthropic Messages API adapter.
pub mod anthropic;
/// Request routing and the non-2xx failure policy.
pub mod dispatcher;
/// Google Generative Language API adapter.
pub mod google;
/// Recording transport for tests.
pub mod mock;
/// `OpenAI` Chat Completions adapter.
pub mod openai;
/// Validation, template resolution, and dispatch in one call.
pub mod optimizer;
/// `reqwest`-backed transport.
pub mod transport;

pub use adapter::{ADAPTERS, ProviderAdapter, ProviderCall, adapter_for};
pub use anthropic::AnthropicAdapter;
pub use dispatcher::Dispatcher;
pub use google::GoogleAdapter;
pub use mock::MockTransport;
pub use openai::OpenAiAdapter;
pub use optimizer::PromptOptimizer;
pub use transport::ReqwestTransport;
