use core::result::Result as CoreResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlDeError;
use toml::ser::Error as TomlSerError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur while optimizing a prompt or managing settings.
///
/// The `Display` text of each variant is exactly what callers show the user,
/// so provider and transport messages are passed through without a prefix.
#[derive(Debug, Error)]
pub enum Error {
    /// The prompt or the API key was empty.
    #[error("Missing required parameters")]
    MissingParameters,

    /// The provider selector is not one of the known vendors.
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The vendor answered with a non-success status and a readable message.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error.message` from the response body.
        message: String,
    },

    /// The vendor answered with a non-success status and no usable message.
    #[error("HTTP {status}{}", reason_suffix(.reason))]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status, empty for unregistered codes.
        reason: String,
    },

    /// An HTTP request failed before a response was received.
    #[error("{0}")]
    Request(#[from] ReqwestError),

    /// A non-reqwest transport failed.
    #[error("{0}")]
    Transport(String),

    /// A response body was not valid JSON.
    #[error("{0}")]
    Json(#[from] SerdeJsonError),

    /// The response was valid JSON but did not have the expected shape.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// Settings are invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] TomlDeError),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] TomlSerError),
}

/// `": <reason>"`, or nothing when the status has no reason phrase.
fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(": {reason}")
    }
}

impl Error {
    /// Returns `true` if the error was detected before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingParameters | Self::UnsupportedProvider(_))
    }

    /// HTTP status attached to the error, if the vendor responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
