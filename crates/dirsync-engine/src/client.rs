//! Directory client seam.
//!
//! The engine never talks to the directory service directly; it consumes this
//! trait. Implementations own authentication, pagination, timeouts and
//! transport-level retries, and report one success/failure result per call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::record::ContactRecord;

/// Raw remote record as returned by the directory listing.
///
/// Every contact field is optional here: remote records are loose mappings
/// and are validated once, at the loader boundary, not inside the diff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// The directory object id.
    pub remote_id: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub business_phone: Option<String>,
    pub mobile: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub office_location: Option<String>,
}

impl DirectoryEntry {
    /// Validates required fields and converts into a [`ContactRecord`].
    ///
    /// Returns `None` when `email`, `given_name`/`surname`, or
    /// `department`/`job_title`/`office_location` is missing or blank; such
    /// entries are excluded from reconciliation.
    #[must_use]
    pub fn into_record(self) -> Option<ContactRecord> {
        let email = non_blank(self.email)?;
        let given_name = non_blank(self.given_name)?;
        let surname = non_blank(self.surname)?;
        let department = non_blank(self.department)?;
        let job_title = non_blank(self.job_title)?;
        let office_location = non_blank(self.office_location)?;

        Some(ContactRecord {
            email,
            given_name,
            surname,
            business_phone: self.business_phone.filter(|v| !v.trim().is_empty()),
            mobile: self.mobile.filter(|v| !v.trim().is_empty()),
            department,
            job_title,
            office_location,
            remote_id: Some(self.remote_id),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Authenticated access to the remote directory contact set.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Lists all contacts currently present remotely.
    async fn list_contacts(&self) -> SyncResult<Vec<DirectoryEntry>>;

    /// Creates a contact and returns the newly assigned remote id.
    async fn create(&self, record: &ContactRecord) -> SyncResult<String>;

    /// Updates the contact identified by `remote_id` to match `record`.
    async fn update(&self, remote_id: &str, record: &ContactRecord) -> SyncResult<()>;

    /// Deletes the contact identified by `remote_id`.
    async fn delete(&self, remote_id: &str) -> SyncResult<()>;
}
