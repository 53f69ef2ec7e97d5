//! Configuration management for the promptsmith CLI
//!
//! Settings live in a TOML file under the user config directory. API keys may
//! also come from the environment; those never get written back to disk.

use std::fs;
use std::path::{Path, PathBuf};

use promptsmith_core::{Error, Provider, Result, Settings, SettingsStore};

/// Checked before the provider-specific variable.
pub const ENV_API_KEY: &str = "PROMPTSMITH_API_KEY";

/// Settings persisted as a TOML file.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Location of the settings file.
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/promptsmith/settings.toml`.
    ///
    /// # Errors
    /// Returns an error if the platform has no config directory.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("promptsmith").join("settings.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_owned()))
    }

    /// Location of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            tracing::debug!("No settings at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        let settings: Settings = toml::from_str(&contents)?;
        tracing::debug!(
            "Loaded settings from {}: api_key={}",
            self.path.display(),
            if settings.has_api_key() { "present" } else { "missing" }
        );
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(settings)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// Fills an empty `apiKey` from the environment.
///
/// `PROMPTSMITH_API_KEY` wins over the provider-specific variable
/// (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, `GEMINI_API_KEY`). A stored key is
/// never replaced.
pub fn apply_env_key<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if settings.has_api_key() {
        return;
    }

    let mut names = vec![ENV_API_KEY];
    if let Ok(provider) = Provider::resolve(settings.provider.as_deref()) {
        names.push(provider.env_key());
    }

    settings.api_key = names
        .into_iter()
        .filter_map(&lookup)
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty());
}

/// Command-line values that replace stored settings for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Provider selector.
    pub provider: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Template selector.
    pub context_style: Option<String>,
    /// API key.
    pub api_key: Option<String>,
}

/// Applies `overrides`, then fills an empty key from the environment.
///
/// The environment lookup runs last so it follows the provider actually
/// being called, not the stored one.
pub fn apply_overrides<F>(settings: &mut Settings, overrides: Overrides, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if overrides.provider.is_some() {
        settings.provider = overrides.provider;
    }
    if overrides.model.is_some() {
        settings.model = overrides.model;
    }
    if overrides.context_style.is_some() {
        settings.context_style = overrides.context_style;
    }
    if overrides.api_key.is_some() {
        settings.api_key = overrides.api_key;
    }
    apply_env_key(settings, lookup);
}

/// Shortens a key for display, keeping a few characters at each end.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{head}...{tail}")
}

/// Copy of `settings` safe to print.
pub fn masked(settings: &Settings) -> Settings {
    let mut copy = settings.clone();
    copy.api_key = copy.api_key.as_deref().map(mask_key);
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp.path().join("nested").join("settings.toml"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp.path().join("nested").join("settings.toml"));

        let mut settings = Settings::default();
        settings.set("provider", "openai").unwrap();
        settings.set("apiKey", "sk-test").unwrap();
        settings.set("contextStyle", "structured").unwrap();
        settings.set("maxTokens", "1200").unwrap();
        settings.endpoints.openai = "http://localhost:4010".to_owned();
        store.save(&settings).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("apiKey = \"sk-test\""));
        assert!(contents.contains("contextStyle = \"structured\""));
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("settings.toml");
        fs::write(&path, "model = \"gpt-4o\"\n\n[endpoints]\ngoogle = \"http://proxy\"\n").unwrap();

        let settings = FileStore::new(&path).load().unwrap();
        assert_eq!(settings.model.as_deref(), Some("gpt-4o"));
        assert_eq!(settings.endpoints.google, "http://proxy");
        assert_eq!(settings.endpoints.anthropic, "https://api.anthropic.com");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("settings.toml");
        fs::write(&path, "model = [").unwrap();
        assert!(matches!(FileStore::new(&path).load(), Err(Error::TomlDe(_))));
    }

    #[test]
    fn test_env_key_precedence() {
        let mut settings = Settings::default();
        apply_env_key(
            &mut settings,
            env(&[("PROMPTSMITH_API_KEY", "generic"), ("ANTHROPIC_API_KEY", "vendor")]),
        );
        assert_eq!(settings.api_key.as_deref(), Some("generic"));

        let mut settings = Settings::default();
        settings.set("provider", "google").unwrap();
        apply_env_key(
            &mut settings,
            env(&[("ANTHROPIC_API_KEY", "wrong"), ("GEMINI_API_KEY", "gem")]),
        );
        assert_eq!(settings.api_key.as_deref(), Some("gem"));
    }

    #[test]
    fn test_env_never_replaces_stored_key() {
        let mut settings = Settings::default();
        settings.set("apiKey", "stored").unwrap();
        apply_env_key(&mut settings, env(&[("PROMPTSMITH_API_KEY", "env")]));
        assert_eq!(settings.api_key.as_deref(), Some("stored"));
    }

    #[test]
    fn test_env_key_follows_requested_provider() {
        let mut settings = Settings::default();
        apply_overrides(
            &mut settings,
            Overrides {
                provider: Some("google".to_owned()),
                ..Overrides::default()
            },
            env(&[("ANTHROPIC_API_KEY", "anthropic"), ("GEMINI_API_KEY", "gem")]),
        );
        assert_eq!(settings.provider.as_deref(), Some("google"));
        assert_eq!(settings.api_key.as_deref(), Some("gem"));

        let mut settings = Settings::default();
        apply_overrides(
            &mut settings,
            Overrides {
                provider: Some("openai".to_owned()),
                ..Overrides::default()
            },
            env(&[("ANTHROPIC_API_KEY", "anthropic")]),
        );
        assert_eq!(settings.api_key, None);
    }

    #[test]
    fn test_override_key_beats_environment() {
        let mut settings = Settings::default();
        settings.set("model", "stored-model").unwrap();
        apply_overrides(
            &mut settings,
            Overrides {
                api_key: Some("flag".to_owned()),
                context_style: Some("quick".to_owned()),
                ..Overrides::default()
            },
            env(&[("PROMPTSMITH_API_KEY", "env")]),
        );
        assert_eq!(settings.api_key.as_deref(), Some("flag"));
        assert_eq!(settings.model.as_deref(), Some("stored-model"));
        assert_eq!(settings.context_style.as_deref(), Some("quick"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-ant-1234567890"), "sk-a...7890");
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(masked(&Settings::default()).api_key, None);
    }
}
