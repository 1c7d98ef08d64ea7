//! All error types for the xcpatch crate.
//!
//! Skipped mutations are not errors: they are reported through the report
//! structs of each operation. These variants cover everything that stops an
//! operation from running at all.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid glob pattern `{pattern}`: {message}")]
    Glob { pattern: String, message: String },

    #[error("invalid identifier `{0}`: expected 24 uppercase hex digits")]
    InvalidIdentifier(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a new glob error for the given pattern.
    pub fn glob_error(pattern: impl Into<String>, message: impl ToString) -> Self {
        Error::Glob {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
