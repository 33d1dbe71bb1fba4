//! Graph client configuration and credentials.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

const DEFAULT_LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";
const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com";
const DEFAULT_FOLDER_NAME: &str = "Work Contacts";

fn default_login_endpoint() -> String {
    DEFAULT_LOGIN_ENDPOINT.to_string()
}

fn default_graph_endpoint() -> String {
    DEFAULT_GRAPH_ENDPOINT.to_string()
}

fn default_folder_name() -> String {
    DEFAULT_FOLDER_NAME.to_string()
}

fn default_api_version() -> String {
    "v1.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

fn default_page_size() -> u32 {
    100
}

/// Configuration for the Graph directory client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Entra tenant id.
    pub tenant_id: String,
    /// Mailbox (user principal name) whose contact folder is reconciled.
    pub target_mailbox: String,
    /// Display name of the contact folder, created if absent.
    #[serde(default = "default_folder_name")]
    pub folder_name: String,
    /// Token endpoint base; overridable for tests.
    #[serde(default = "default_login_endpoint")]
    pub login_endpoint: String,
    /// Graph endpoint base; overridable for tests.
    #[serde(default = "default_graph_endpoint")]
    pub graph_endpoint: String,
    /// Graph API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum retries for transient failures (502/503/504) and 429s.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Page size for the contact listing.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl GraphConfig {
    /// Creates a configuration with public-cloud defaults.
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, target_mailbox: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            target_mailbox: target_mailbox.into(),
            folder_name: default_folder_name(),
            login_endpoint: default_login_endpoint(),
            graph_endpoint: default_graph_endpoint(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            page_size: default_page_size(),
        }
    }

    /// Overrides the contact folder name.
    #[must_use]
    pub fn with_folder_name(mut self, name: impl Into<String>) -> Self {
        self.folder_name = name.into();
        self
    }

    /// Points both endpoints at a test server.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        login_endpoint: impl Into<String>,
        graph_endpoint: impl Into<String>,
    ) -> Self {
        self.login_endpoint = login_endpoint.into();
        self.graph_endpoint = graph_endpoint.into();
        self
    }

    /// Base URL for API requests: `{graph_endpoint}/{api_version}`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.graph_endpoint, self.api_version)
    }

    /// Validates required fields.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Config`] on blank tenant id, mailbox or folder
    /// name.
    pub fn validate(&self) -> GraphResult<()> {
        if self.tenant_id.trim().is_empty() {
            return Err(GraphError::Config("tenant_id must not be empty".to_string()));
        }
        if self.target_mailbox.trim().is_empty() {
            return Err(GraphError::Config(
                "target_mailbox must not be empty".to_string(),
            ));
        }
        if self.folder_name.trim().is_empty() {
            return Err(GraphError::Config(
                "folder_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application credentials for the client-credentials flow.
///
/// The secret is wrapped in [`SecretString`] so it never appears in debug
/// output; it is exposed only when building the token request.
#[derive(Debug, Clone)]
pub struct GraphCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl GraphCredentials {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Validates required fields.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Config`] when the client id is blank.
    pub fn validate(&self) -> GraphResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(GraphError::Config("client_id must not be empty".to_string()));
        }
        Ok(())
    }
}
