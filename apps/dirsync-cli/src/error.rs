//! CLI error types and exit codes

use dirsync_engine::SyncError;
use dirsync_graph::GraphError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication error
/// - 3: Network error
/// - 4: Validation error
/// - 5: Directory service error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Directory service error: {0}")]
    Directory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Authentication(_) => 2,
            CliError::Network(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Directory(_) => 5,
            CliError::Config(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {suggestion}");
            } else {
                eprintln!("\nSuggestion: {suggestion}");
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Authentication(_) => {
                Some("Check CLIENT_ID, CLIENT_SECRET and TENANT_ID, and that the app registration has Contacts.ReadWrite application permission.")
            }
            CliError::Network(_) => Some("Check your network connection and try again."),
            CliError::Validation(_) => {
                Some("Pass the value as a flag, or set it in the environment or a .env file.")
            }
            _ => None,
        }
    }
}

impl From<SyncError> for CliError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::DesiredLoad(_) | SyncError::EmptyDesiredState { .. } => {
                CliError::Validation(e.to_string())
            }
            SyncError::RemoteLoad(_) | SyncError::Directory(_) => {
                CliError::Directory(e.to_string())
            }
            SyncError::CheckpointPersist(_) | SyncError::Report(_) | SyncError::CsvWrite(_) => {
                CliError::Io(e.to_string())
            }
        }
    }
}

impl From<GraphError> for CliError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Auth(_) => CliError::Authentication(e.to_string()),
            GraphError::Http(_) => CliError::Network(e.to_string()),
            GraphError::Config(_) => CliError::Config(e.to_string()),
            GraphError::Api { .. }
            | GraphError::RateLimited { .. }
            | GraphError::Json(_)
            | GraphError::Folder(_) => CliError::Directory(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Authentication("x".into()).exit_code(), 2);
        assert_eq!(CliError::Network("x".into()).exit_code(), 3);
        assert_eq!(CliError::Validation("x".into()).exit_code(), 4);
        assert_eq!(CliError::Directory("x".into()).exit_code(), 5);
        assert_eq!(CliError::Config("x".into()).exit_code(), 1);
        assert_eq!(CliError::Io("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_empty_desired_state_maps_to_validation() {
        let e = CliError::from(SyncError::EmptyDesiredState { actual_count: 3 });
        assert_eq!(e.exit_code(), 4);
    }
}
