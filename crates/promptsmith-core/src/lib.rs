//! Core types and traits for the prompt optimizer.
//!
//! This crate provides the request/result types, the static template catalog,
//! the settings store, error handling, and the transport trait used by the
//! provider adapters.
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

/// Error types and result definitions.
pub mod error;
/// Supported UI languages and locale detection.
pub mod language;
/// Settings store keyed by the extension's setting names.
pub mod settings;
/// Lock helpers.
pub mod sync;
/// Static prompt-engineering templates.
pub mod templates;
/// Trait definitions for HTTP transports.
pub mod traits;
/// Core data types for requests, results, and providers.
pub mod types;

pub use error::{Error, Result};
pub use language::{
    FALLBACK_LANGUAGE, LanguageInfo, SUPPORTED_LANGUAGES, detect_language, extract_language_code,
    language_info,
};
pub use settings::{Endpoints, MemoryStore, PUBLIC_KEYS, SETTING_KEYS, Settings, SettingsStore};
pub use sync::IgnoreLock;
pub use templates::{TEMPLATE_MARKER, resolve_template};
pub use traits::{HttpRequest, HttpResponse, HttpTransport};
pub use types::{
    ContextStyle, DEFAULT_MAX_TOKENS, OptimizationReply, OptimizationRequest, OptimizationResult,
    Provider,
};
