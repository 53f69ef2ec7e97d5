use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Output-token cap sent to every provider unless overridden.
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// LLM vendor a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Anthropic Messages API.
    Anthropic,
    /// `OpenAI` Chat Completions API.
    #[serde(rename = "openai")]
    OpenAi,
    /// Google Generative Language API.
    Google,
}

impl Provider {
    /// All providers in table order.
    pub const ALL: [Self; 3] = [Self::Anthropic, Self::OpenAi, Self::Google];

    /// Wire identifier used in requests and settings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Google => "google",
        }
    }

    /// Model used when the caller does not name one.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-5-sonnet-20241022",
            Self::OpenAi => "gpt-4o-mini",
            Self::Google => "gemini-1.5-flash",
        }
    }

    /// Environment variable holding this vendor's API key.
    pub const fn env_key(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Google => "GEMINI_API_KEY",
        }
    }

    /// Resolves an optional selector. Absent or blank means Anthropic.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedProvider`] for any other unknown value.
    pub fn resolve(selector: Option<&str>) -> Result<Self> {
        match selector.map(str::trim) {
            None | Some("") => Ok(Self::Anthropic),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == value)
            .ok_or_else(|| Error::UnsupportedProvider(value.to_owned()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Which rewrite template to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStyle {
    /// Full best-practice rewrite.
    #[default]
    Comprehensive,
    /// Short clarity pass.
    Quick,
    /// Restructure into explicit sections and steps.
    Structured,
    /// Push towards open-ended, creative output.
    Creative,
}

impl ContextStyle {
    /// All styles in catalog order.
    pub const ALL: [Self; 4] = [
        Self::Comprehensive,
        Self::Quick,
        Self::Structured,
        Self::Creative,
    ];

    /// Wire identifier used in requests and settings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comprehensive => "comprehensive",
            Self::Quick => "quick",
            Self::Structured => "structured",
            Self::Creative => "creative",
        }
    }

    /// Resolves an optional selector, falling back to `Comprehensive`.
    pub fn resolve(selector: Option<&str>) -> Self {
        selector
            .map(str::trim)
            .and_then(|value| Self::ALL.into_iter().find(|style| style.as_str() == value))
            .unwrap_or_default()
    }
}

impl fmt::Display for ContextStyle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single optimize call as received from a caller.
///
/// Selectors stay as raw strings so that resolution (and its errors) happens
/// inside the optimizer, not at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    /// Raw text to rewrite.
    #[serde(default)]
    pub user_prompt: String,
    /// Vendor selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Vendor credential.
    #[serde(default)]
    pub api_key: String,
    /// Vendor model identifier, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Template selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_style: Option<String>,
}

impl OptimizationRequest {
    /// Creates a request with default provider, model, and style.
    pub fn new<P: Into<String>, K: Into<String>>(user_prompt: P, api_key: K) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Sets the provider selector.
    #[must_use]
    pub fn with_provider<T: Into<String>>(mut self, provider: T) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model<T: Into<String>>(mut self, model: T) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the template selector.
    #[must_use]
    pub fn with_context_style<T: Into<String>>(mut self, context_style: T) -> Self {
        self.context_style = Some(context_style.into());
        self
    }

    /// Checks that the prompt and the key are both present.
    ///
    /// # Errors
    /// Returns [`Error::MissingParameters`] if either is blank.
    pub fn validate(&self) -> Result<()> {
        if self.user_prompt.trim().is_empty() || self.api_key.trim().is_empty() {
            return Err(Error::MissingParameters);
        }
        Ok(())
    }

    /// Model to send for `provider`: the requested one, or the vendor default.
    pub fn model_for(&self, provider: Provider) -> &str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| provider.default_model())
    }
}

/// Outcome of one optimize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationResult {
    /// The model returned a rewrite.
    Success {
        /// Rewritten prompt text.
        optimized_text: String,
    },
    /// Validation, transport, or decoding failed.
    Failure {
        /// Message to show the user verbatim.
        message: String,
    },
}

impl OptimizationResult {
    /// Returns `true` for `Success`.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts into the wire reply shape.
    pub fn into_reply(self) -> OptimizationReply {
        match self {
            Self::Success { optimized_text } => OptimizationReply {
                success: true,
                optimized_prompt: Some(optimized_text),
                error: None,
            },
            Self::Failure { message } => OptimizationReply {
                success: false,
                optimized_prompt: None,
                error: Some(message),
            },
        }
    }
}

impl From<Result<String>> for OptimizationResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(optimized_text) => Self::Success { optimized_text },
            Err(err) => Self::Failure {
                message: err.to_string(),
            },
        }
    }
}

/// `{ success, optimizedPrompt }` or `{ success, error }` as sent to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReply {
    /// Whether the call succeeded.
    pub success: bool,
    /// Rewritten prompt, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_prompt: Option<String>,
    /// Failure message, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
