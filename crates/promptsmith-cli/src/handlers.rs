//! Command handlers for CLI operations

use std::env;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use console::{Term, style};
use promptsmith_cli::config::{FileStore, Overrides, apply_overrides, mask_key, masked};
use promptsmith_cli::router::{Router, serve_lines};
use promptsmith_core::{
    ContextStyle, OptimizationRequest, OptimizationResult, SUPPORTED_LANGUAGES, Settings,
    SettingsStore as _, detect_language,
};
use promptsmith_providers::{PromptOptimizer, ReqwestTransport};
use tokio::io::{self, AsyncReadExt as _, BufReader};

use crate::cli::ConfigAction;

/// Loads settings, applies `overrides`, and fills the API key from the
/// environment.
fn load_settings(store: &FileStore, overrides: Overrides) -> Result<Settings> {
    let mut settings = store
        .load()
        .with_context(|| format!("Failed to load settings from {}", store.path().display()))?;
    apply_overrides(&mut settings, overrides, |name| env::var(name).ok());
    Ok(settings)
}

/// Runs one request and returns the rewritten prompt.
async fn run(settings: &Settings, request: &OptimizationRequest) -> Result<String> {
    let optimizer = PromptOptimizer::from_settings(Arc::new(ReqwestTransport::new()), settings);
    match optimizer.optimize(request).await {
        OptimizationResult::Success { optimized_text } => Ok(optimized_text),
        OptimizationResult::Failure { message } => bail!("{message}"),
    }
}

/// Handle the optimize command.
///
/// # Errors
/// Returns an error if settings cannot be loaded, stdin cannot be read, or
/// the optimization fails.
pub async fn handle_optimize(
    store: &FileStore,
    prompt: Option<String>,
    overrides: Overrides,
) -> Result<()> {
    // Provider names are checked by the optimizer so the usual message is shown.
    let settings = load_settings(store, overrides)?;

    let prompt = match prompt.filter(|prompt| prompt != "-") {
        Some(prompt) => prompt,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read prompt from stdin")?;
            input.trim_end_matches(['\n', '\r']).to_owned()
        }
    };

    let optimized = run(&settings, &settings.to_request(prompt)).await?;
    Term::stdout().write_line(&optimized)?;
    Ok(())
}

/// Handle the test command: a minimal quick-style request with stored settings.
///
/// # Errors
/// Returns an error if the request fails.
pub async fn handle_test(store: &FileStore) -> Result<()> {
    let settings = load_settings(store, Overrides::default())?;
    let request = settings
        .to_request("Hello")
        .with_context_style(ContextStyle::Quick.as_str());

    let term = Term::stdout();
    term.write_line(&format!("{}", style("Testing API connection...").cyan()))?;
    match run(&settings, &request).await {
        Ok(_) => {
            term.write_line(&format!("{}", style("API connection successful!").green()))?;
            Ok(())
        }
        Err(err) => bail!("API test failed: {err}"),
    }
}

/// Handle the config subcommands.
///
/// # Errors
/// Returns an error for unknown keys, invalid values, or file I/O failures.
pub fn handle_config(store: &FileStore, action: ConfigAction) -> Result<()> {
    let term = Term::stdout();

    match action {
        ConfigAction::Show { full } => {
            let settings = store.load()?;
            if full {
                let toml = toml::to_string_pretty(&masked(&settings))?;
                term.write_line(&format!("# {}", store.path().display()))?;
                term.write_line(toml.trim_end())?;
            } else {
                term.write_line(&format!("{}", style("Settings:").bold()))?;
                for (key, value) in masked(&settings).to_public_map() {
                    term.write_line(&format!("  {key}: {}", value.as_str().unwrap_or_default()))?;
                }
                term.write_line(&format!(
                    "  maxTokens: {}",
                    settings.effective_max_tokens()
                ))?;
            }
        }
        ConfigAction::Get { key } => {
            let settings = store.load()?;
            match settings.get(&key)? {
                Some(value) if key == "apiKey" => term.write_line(&mask_key(&value))?,
                Some(value) => term.write_line(&value)?,
                None => term.write_line(&format!("{}", style("(not set)").dim()))?,
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = store.load()?;
            settings.set(&key, &value)?;
            store.save(&settings)?;
            tracing::info!("Saved {key} to {}", store.path().display());
        }
    }

    Ok(())
}

/// Handle the styles command.
///
/// # Errors
/// Returns an error if writing to the terminal fails.
pub fn handle_styles(store: &FileStore) -> Result<()> {
    let current = ContextStyle::resolve(store.load()?.context_style.as_deref());
    let term = Term::stdout();
    for context_style in ContextStyle::ALL {
        let marker = if context_style == current { "*" } else { " " };
        term.write_line(&format!(
            "{marker} {} {}",
            style(format!("{:<14}", context_style.as_str())).bold(),
            context_style.description()
        ))?;
    }
    Ok(())
}

/// Handle the languages command. The active language comes from the stored
/// setting, then `LANG`.
///
/// # Errors
/// Returns an error if writing to the terminal fails.
pub fn handle_languages(store: &FileStore) -> Result<()> {
    let settings = store.load()?;
    let locale = env::var("LANG").ok();
    let active = detect_language(settings.language.as_deref(), locale.as_deref());

    let term = Term::stdout();
    for language in &SUPPORTED_LANGUAGES {
        let marker = if language.code == active { "*" } else { " " };
        let direction = if language.rtl { " (rtl)" } else { "" };
        term.write_line(&format!(
            "{marker} {:<6} {} / {}{direction}",
            language.code, language.name, language.native_name
        ))?;
    }
    Ok(())
}

/// Handle the serve command: one JSON reply per JSON line on stdin.
///
/// # Errors
/// Returns an error if stdin or stdout fail.
pub async fn handle_serve(store: FileStore) -> Result<()> {
    tracing::info!("Serving messages on stdin (settings: {})", store.path().display());
    let router = Router::new(Arc::new(store), Arc::new(ReqwestTransport::new()));
    let handled = serve_lines(
        &router,
        BufReader::new(io::stdin()),
        io::stdout(),
    )
    .await?;
    tracing::info!("Input closed after {handled} messages");
    Ok(())
}
