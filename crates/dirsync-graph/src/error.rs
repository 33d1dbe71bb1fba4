//! Error types for the Graph directory client.

use thiserror::Error;

/// Result type alias using [`GraphError`].
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur when talking to Microsoft Graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// `OAuth2` authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Graph API error response.
    #[error("Graph API error: {code} - {message}")]
    Api { code: String, message: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Still rate limited after the allowed retries.
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured contact folder could not be resolved or created.
    #[error("contact folder error: {0}")]
    Folder(String),
}

impl GraphError {
    /// Maps into the engine's error space at the trait boundary. Listing
    /// failures are load failures; everything else is a per-call directory
    /// failure the applier isolates.
    #[must_use]
    pub fn into_load_failure(self) -> dirsync_engine::SyncError {
        dirsync_engine::SyncError::RemoteLoad(self.to_string())
    }
}

impl From<GraphError> for dirsync_engine::SyncError {
    fn from(e: GraphError) -> Self {
        dirsync_engine::SyncError::Directory(e.to_string())
    }
}
