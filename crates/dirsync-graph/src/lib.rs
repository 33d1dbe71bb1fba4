//! Microsoft Graph directory client for dirsync.
//!
//! Implements the engine's [`dirsync_engine::DirectoryClient`] trait against
//! a contact folder in a Microsoft 365 mailbox, via the Graph API.
//!
//! # Features
//!
//! - `OAuth2` client credentials authentication with token caching
//! - OData pagination for the contact listing
//! - Transient-error retry with exponential backoff and Retry-After handling
//! - Contact folder resolution (created on first use if absent)
//!
//! # Example
//!
//! ```no_run
//! use dirsync_graph::{GraphConfig, GraphCredentials, GraphDirectoryClient};
//! use dirsync_engine::DirectoryClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GraphConfig::new("your-tenant-id", "shared-mailbox@example.com");
//! let credentials = GraphCredentials::new("client-id", "client-secret");
//!
//! let client = GraphDirectoryClient::new(config, credentials)?;
//! let contacts = client.list_contacts().await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod contacts;
mod error;

pub use auth::TokenCache;
pub use client::{GraphClient, ODataError, ODataResponse};
pub use config::{GraphConfig, GraphCredentials};
pub use contacts::GraphDirectoryClient;
pub use error::{GraphError, GraphResult};
