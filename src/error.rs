//! Error types for davplay.

use thiserror::Error;

/// Broad failure classes, used by callers that need to tell an empty
/// directory apart from a listing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed base URL, missing credentials, unusable local config.
    Configuration,
    /// Connection, TLS or timeout failures.
    Transport,
    /// 401/407 with no usable credentials.
    Authentication,
    /// Unexpected status or malformed WebDAV response.
    Protocol,
}

#[derive(Debug, Error)]
pub enum DavPlayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: server rejected the request for {url}")]
    Unauthorized { url: String },

    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("No credentials configured for this library")]
    MissingCredentials,

    #[error("Malformed WebDAV response: {0}")]
    Xml(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DavPlayError {
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Io(_) => ErrorKind::Transport,
            Self::Unauthorized { .. } => ErrorKind::Authentication,
            Self::Status { status, .. } if *status == 401 || *status == 407 => {
                ErrorKind::Authentication
            }
            Self::Status { .. } | Self::Xml(_) => ErrorKind::Protocol,
            Self::InvalidUrl { .. }
            | Self::UnsupportedScheme(_)
            | Self::MissingCredentials
            | Self::Keyring(_)
            | Self::Config(_)
            | Self::Json(_) => ErrorKind::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, DavPlayError>;
