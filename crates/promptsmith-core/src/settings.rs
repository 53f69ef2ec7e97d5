//! Key-value settings shared by every caller of the optimizer.
//!
//! Keys use the extension's names (`provider`, `apiKey`, `model`,
//! `contextStyle`, `language`) plus the host-side `maxTokens`. Vendor base URLs
//! live in [`Endpoints`] and are only reachable through the settings file.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::language::language_info;
use crate::types::{ContextStyle, DEFAULT_MAX_TOKENS, OptimizationRequest, Provider};
use crate::{Error, IgnoreLock as _, Result};

/// Keys the extension reads back through `getSettings`.
pub const PUBLIC_KEYS: [&str; 5] = ["provider", "apiKey", "model", "contextStyle", "language"];

/// Setting keys accepted by [`Settings::get`] and [`Settings::set`].
pub const SETTING_KEYS: [&str; 6] = [
    "provider",
    "apiKey",
    "model",
    "contextStyle",
    "language",
    "maxTokens",
];

/// Base URLs for each vendor. Paths are appended by the adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Anthropic API base.
    pub anthropic: String,
    /// `OpenAI` API base.
    pub openai: String,
    /// Google Generative Language API base.
    pub google: String,
}

impl Endpoints {
    /// Base URL for `provider`, without a trailing slash.
    pub fn base_for(&self, provider: Provider) -> &str {
        let base = match provider {
            Provider::Anthropic => &self.anthropic,
            Provider::OpenAi => &self.openai,
            Provider::Google => &self.google,
        };
        base.trim_end_matches('/')
    }

    /// Points every vendor at the same base URL.
    pub fn uniform<T: Into<String>>(base: T) -> Self {
        let base = base.into();
        Self {
            anthropic: base.clone(),
            openai: base.clone(),
            google: base,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            anthropic: "https://api.anthropic.com".to_owned(),
            openai: "https://api.openai.com".to_owned(),
            google: "https://generativelanguage.googleapis.com".to_owned(),
        }
    }
}

/// Stored user preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Vendor selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Vendor credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Template selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_style: Option<String>,
    /// UI language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Output-token cap override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Vendor base URLs.
    pub endpoints: Endpoints,
}

impl Settings {
    /// Reads a setting by key.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for keys outside [`SETTING_KEYS`].
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "provider" => self.provider.clone(),
            "apiKey" => self.api_key.clone(),
            "model" => self.model.clone(),
            "contextStyle" => self.context_style.clone(),
            "language" => self.language.clone(),
            "maxTokens" => self.max_tokens.map(|tokens| tokens.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Writes a setting. An empty value clears it.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for unknown keys, unsupported providers,
    /// styles or languages, and token caps that are not positive integers.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();
        let cleared = trimmed.is_empty();
        let owned = (!cleared).then(|| trimmed.to_owned());

        match key {
            "provider" => {
                if let Some(provider) = &owned {
                    provider
                        .parse::<Provider>()
                        .map_err(|err| Error::Config(err.to_string()))?;
                }
                self.provider = owned;
            }
            "apiKey" => self.api_key = owned,
            "model" => self.model = owned,
            "contextStyle" => {
                if let Some(style) = owned.as_deref().filter(|style| !is_context_style(style)) {
                    return Err(Error::Config(format!("Unsupported context style: {style}")));
                }
                self.context_style = owned;
            }
            "language" => {
                if let Some(code) = owned.as_deref().filter(|code| language_info(code).is_none()) {
                    return Err(Error::Config(format!("Unsupported language: {code}")));
                }
                self.language = owned;
            }
            "maxTokens" => {
                self.max_tokens = match owned {
                    None => None,
                    Some(raw) => Some(parse_max_tokens(&raw)?),
                };
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Applies a batch of values. Either every value is applied or none is.
    ///
    /// Strings and numbers are stored as text; `null` clears the key.
    ///
    /// # Errors
    /// Returns the first error from [`Settings::set`], or [`Error::Config`]
    /// for values of any other JSON type.
    pub fn merge(&mut self, values: &Map<String, Value>) -> Result<()> {
        let mut next = self.clone();
        for (key, value) in values {
            let text = match value {
                Value::Null => String::new(),
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                    return Err(Error::Config(format!(
                        "Setting {key} must be a string or number"
                    )));
                }
            };
            next.set(key, &text)?;
        }
        *self = next;
        Ok(())
    }

    /// The extension-visible keys as a JSON object, omitting unset ones.
    pub fn to_public_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for key in PUBLIC_KEYS {
            if let Ok(Some(value)) = self.get(key) {
                map.insert(key.to_owned(), Value::String(value));
            }
        }
        map
    }

    /// Builds a request for `user_prompt` from these settings.
    pub fn to_request<T: Into<String>>(&self, user_prompt: T) -> OptimizationRequest {
        OptimizationRequest {
            user_prompt: user_prompt.into(),
            provider: self.provider.clone(),
            api_key: self.api_key.clone().unwrap_or_default(),
            model: self.model.clone(),
            context_style: self.context_style.clone(),
        }
    }

    /// Output-token cap to configure dispatchers with.
    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Returns `true` when an API key is stored.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!("Unknown setting: {key}"))
}

fn is_context_style(value: &str) -> bool {
    ContextStyle::ALL.iter().any(|style| style.as_str() == value)
}

fn parse_max_tokens(raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(tokens) if tokens > 0 => Ok(tokens),
        _ => Err(Error::Config(format!(
            "maxTokens must be a positive integer, got {raw}"
        ))),
    }
}

/// Persistence for [`Settings`].
pub trait SettingsStore: Send + Sync {
    /// Loads the current settings.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read or parsed.
    fn load(&self) -> Result<Settings>;

    /// Replaces the stored settings.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// In-process store. Used by tests and embedders that own persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Current settings.
    settings: Mutex<Settings>,
}

impl MemoryStore {
    /// Creates a store holding `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings> {
        Ok(self.settings.lock_ignore_poison().clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.settings.lock_ignore_poison() = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_then_get() {
        let mut settings = Settings::default();
        settings.set("apiKey", " sk-test ").unwrap();
        settings.set("contextStyle", "quick").unwrap();
        settings.set("maxTokens", "1000").unwrap();

        assert_eq!(settings.get("apiKey").unwrap().as_deref(), Some("sk-test"));
        assert_eq!(settings.get("contextStyle").unwrap().as_deref(), Some("quick"));
        assert_eq!(settings.effective_max_tokens(), 1000);
    }

    #[test]
    fn test_empty_value_clears() {
        let mut settings = Settings::default();
        settings.set("model", "gpt-4o").unwrap();
        settings.set("model", "").unwrap();
        assert_eq!(settings.get("model").unwrap(), None);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(matches!(settings.set("colour", "red"), Err(Error::Config(_))));
        assert!(matches!(settings.set("language", "xx"), Err(Error::Config(_))));
        assert!(matches!(settings.set("provider", "azure"), Err(Error::Config(_))));
        assert!(matches!(settings.set("maxTokens", "0"), Err(Error::Config(_))));
        assert!(matches!(settings.get("colour"), Err(Error::Config(_))));
        settings.set("language", "zh-CN").unwrap();
    }

    #[test]
    fn test_context_style_must_be_known() {
        let mut settings = Settings::default();
        let err = settings.set("contextStyle", "verbose").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unsupported context style: verbose"
        );
        assert_eq!(settings.context_style, None);

        for style in ContextStyle::ALL {
            settings.set("contextStyle", style.as_str()).unwrap();
        }
        assert_eq!(settings.get("contextStyle").unwrap().as_deref(), Some("creative"));
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut settings = Settings::default();
        let good = json!({"apiKey": "k", "maxTokens": 1200, "model": null});
        settings.merge(good.as_object().unwrap()).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("k"));
        assert_eq!(settings.max_tokens, Some(1200));

        let bad = json!({"model": "gpt-4o", "language": "xx"});
        settings.merge(bad.as_object().unwrap()).unwrap_err();
        assert_eq!(settings.model, None);
    }

    #[test]
    fn test_public_map_hides_host_keys() {
        let mut settings = Settings::default();
        settings.set("provider", "openai").unwrap();
        settings.set("maxTokens", "1000").unwrap();
        let map = settings.to_public_map();
        assert_eq!(map.get("provider"), Some(&json!("openai")));
        assert!(!map.contains_key("maxTokens"));
        assert!(!map.contains_key("apiKey"));
    }

    #[test]
    fn test_to_request_copies_selectors() {
        let mut settings = Settings::default();
        settings.set("provider", "google").unwrap();
        settings.set("apiKey", "k").unwrap();
        let request = settings.to_request("hi");
        assert_eq!(request.provider.as_deref(), Some("google"));
        assert_eq!(request.api_key, "k");
        assert_eq!(request.user_prompt, "hi");
        assert!(request.context_style.is_none());
    }

    #[test]
    fn test_endpoints_strip_trailing_slash() {
        let endpoints = Endpoints::uniform("http://127.0.0.1:8080/");
        assert_eq!(endpoints.base_for(Provider::Google), "http://127.0.0.1:8080");
        assert_eq!(
            Endpoints::default().base_for(Provider::Anthropic),
            "https://api.anthropic.com"
        );
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::default();
        let mut settings = store.load().unwrap();
        settings.set("apiKey", "k").unwrap();
        store.save(&settings).unwrap();
        assert!(store.load().unwrap().has_api_key());
    }
}
