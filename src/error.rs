//! Error types for moodlist.

use std::time::Duration;

use thiserror::Error;

/// Reasons the Spotify credential cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Nobody signed in yet (or the session was deleted)
    #[error("You must be logged in to access Spotify features")]
    NoSession,

    /// The last refresh exchange failed and the session carries the sentinel
    #[error("Session needs refresh. Please log in again.")]
    RefreshFailed,

    /// A session exists but holds no access token
    #[error("Spotify access token missing. Please log in again.")]
    MissingAccessToken,
}

impl AuthError {
    /// Whether the surrounding application should start an interactive login.
    pub fn requires_login(&self) -> bool {
        matches!(self, AuthError::RefreshFailed | AuthError::MissingAccessToken)
    }
}

/// Errors that can occur while generating and managing playlists.
#[derive(Error, Debug)]
pub enum Error {
    /// The Spotify credential is missing or unusable
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An external API answered with a non-success status
    #[error("{service} error ({status}): {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// A response or generated text could not be interpreted
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// No tracks at all could be found for a generation request
    #[error("{0}")]
    ResolutionExhausted(String),

    /// A bounded request did not finish in time
    #[error("Request timed out after {0:?}")]
    NetworkTimeout(Duration),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Local cache IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local cache (de)serialization failure
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Missing or malformed configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation not valid in the current lifecycle state
    #[error("{0}")]
    InvalidState(String),
}

impl Error {
    /// Returns the authentication failure behind this error, if any.
    pub fn auth(&self) -> Option<&AuthError> {
        match self {
            Error::Auth(e) => Some(e),
            _ => None,
        }
    }
}
