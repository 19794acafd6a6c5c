//! Error types for SiteCloner

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a site cloning operation
///
/// Parsing never produces an error: malformed HTML and CSS degrade to
/// partial results instead.
#[derive(Debug, Error)]
pub enum SiteError {
    /// A required combination of arguments was not supplied
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// URL could not be parsed or is not http(s)
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Transport-level failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status
    #[error("HTTP status error: {0}")]
    HttpStatus(u16),

    /// Body is binary or not valid UTF-8
    #[error("Decode error: {0}")]
    Decode(String),

    /// Downloaded bytes could not be written
    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tool name not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments did not match the input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl SiteError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SiteError::HttpStatus(status.as_u16())
        } else if err.is_timeout() {
            SiteError::Network("request timed out".to_string())
        } else if err.is_connect() {
            SiteError::Network(format!("failed to connect: {}", err))
        } else if err.is_decode() {
            SiteError::Decode(err.to_string())
        } else {
            SiteError::Network(err.to_string())
        }
    }

    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        SiteError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
