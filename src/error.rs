use thiserror::Error;

use crate::forms::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-side validation failed; no request was sent.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The server refused the request. Field messages have already been
    /// routed onto form fields where possible.
    #[error("Server rejected request ({status}): {errors}")]
    Rejected { status: u16, errors: FieldErrors },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not signed in: {0}")]
    Unauthorized(String),

    #[error("Unexpected API response: {0}")]
    Api(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Field-scoped errors carried by this error, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(errors) | AppError::Rejected { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
