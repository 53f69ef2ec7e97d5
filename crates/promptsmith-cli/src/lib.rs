//! Host-side pieces of the promptsmith CLI: the TOML settings store and the
//! message router behind `promptsmith serve`.
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

/// Settings file location, persistence, and environment overrides.
pub mod config;
/// Extension-style message handling over newline-delimited JSON.
pub mod router;
