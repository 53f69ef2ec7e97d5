//! Message router for `promptsmith serve`.
//!
//! Speaks the same `{action, data}` messages the browser extension sends to
//! its background worker, one JSON object per line in each direction.

use core::str;
use std::sync::Arc;

use promptsmith_core::{
    HttpTransport, OptimizationReply, OptimizationRequest, Result, SettingsStore,
};
use promptsmith_providers::PromptOptimizer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _};

/// A request from a UI surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Rewrite a prompt with the credentials in `data`.
    OptimizePrompt {
        /// Request exactly as the caller built it.
        #[serde(default)]
        data: OptimizationRequest,
    },
    /// Read the extension-visible settings.
    GetSettings,
    /// Merge `data` into the stored settings.
    SaveSettings {
        /// Keys and values to store.
        #[serde(default)]
        data: Map<String, Value>,
    },
}

/// Answer to a [`Message`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Whether the action succeeded.
    pub success: bool,
    /// Rewritten prompt for `optimizePrompt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_prompt: Option<String>,
    /// Stored settings for `getSettings`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    /// Bare success.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Failure carrying `message`.
    pub fn failure<T: Into<String>>(message: T) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

impl From<OptimizationReply> for Reply {
    fn from(reply: OptimizationReply) -> Self {
        Self {
            success: reply.success,
            optimized_prompt: reply.optimized_prompt,
            settings: None,
            error: reply.error,
        }
    }
}

/// Dispatches messages to the optimizer and the settings store.
pub struct Router {
    /// Settings persistence.
    store: Arc<dyn SettingsStore>,
    /// Network transport handed to each optimizer.
    transport: Arc<dyn HttpTransport>,
}

impl Router {
    /// Creates a router over `store` and `transport`.
    pub fn new(store: Arc<dyn SettingsStore>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { store, transport }
    }

    /// Handles one message. Every failure is reported in the reply.
    pub async fn handle(&self, message: Message) -> Reply {
        match message {
            Message::OptimizePrompt { data } => self.optimize(&data).await,
            Message::GetSettings => match self.store.load() {
                Ok(settings) => Reply {
                    settings: Some(settings.to_public_map()),
                    ..Reply::ok()
                },
                Err(err) => Reply::failure(err.to_string()),
            },
            Message::SaveSettings { data } => match self.save(&data) {
                Ok(()) => Reply::ok(),
                Err(err) => Reply::failure(err.to_string()),
            },
        }
    }

    /// Parses and handles one line of input.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match serde_json::from_str::<Message>(line) {
            Ok(message) => self.handle(message).await,
            Err(err) => {
                tracing::warn!("Rejected message: {err}");
                Reply::failure(format!("Invalid message: {err}"))
            }
        }
    }

    async fn optimize(&self, request: &OptimizationRequest) -> Reply {
        // Endpoint and token-cap overrides are read per call so that a
        // preceding saveSettings takes effect immediately.
        let settings = match self.store.load() {
            Ok(settings) => settings,
            Err(err) => return Reply::failure(err.to_string()),
        };
        let optimizer = PromptOptimizer::from_settings(Arc::clone(&self.transport), &settings);
        optimizer.optimize(request).await.into_reply().into()
    }

    fn save(&self, data: &Map<String, Value>) -> Result<()> {
        let mut settings = self.store.load()?;
        settings.merge(data)?;
        self.store.save(&settings)
    }
}

/// Answers each non-blank input line with exactly one output line until EOF.
///
/// Lines that are not valid UTF-8 get a failure reply like any other
/// malformed message. Returns the number of messages handled.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn serve_lines<R, W>(router: &Router, mut reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = Vec::new();
    let mut handled = 0;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }

        let reply = match str::from_utf8(&buffer) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => router.handle_line(line.trim_end_matches(['\n', '\r'])).await,
            Err(err) => {
                tracing::warn!("Rejected message: {err}");
                Reply::failure(format!("Invalid message: {err}"))
            }
        };

        let mut encoded = serde_json::to_string(&reply)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    Ok(handled)
}
