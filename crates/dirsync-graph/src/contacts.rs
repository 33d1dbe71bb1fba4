//! Contact folder resolution and contact CRUD against Microsoft Graph.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use dirsync_engine::{ContactRecord, DirectoryClient, DirectoryEntry, SyncResult};

use crate::auth::TokenCache;
use crate::client::GraphClient;
use crate::config::{GraphConfig, GraphCredentials};
use crate::error::{GraphError, GraphResult};

const CONTACT_SELECT_FIELDS: &str = "id,givenName,surname,emailAddresses,businessPhones,\
    mobilePhone,department,jobTitle,officeLocation";

/// Email address entry in Graph contact payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A contact as returned by the Graph listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphContact {
    id: String,
    given_name: Option<String>,
    surname: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    business_phones: Vec<String>,
    mobile_phone: Option<String>,
    department: Option<String>,
    job_title: Option<String>,
    office_location: Option<String>,
}

impl GraphContact {
    fn into_entry(self) -> DirectoryEntry {
        DirectoryEntry {
            remote_id: self.id,
            email: self.email_addresses.into_iter().next().map(|e| e.address),
            given_name: self.given_name,
            surname: self.surname,
            business_phone: self.business_phones.into_iter().find(|p| !p.trim().is_empty()),
            mobile: self.mobile_phone,
            department: self.department,
            job_title: self.job_title,
            office_location: self.office_location,
        }
    }
}

/// Outbound contact payload for create and update calls.
///
/// `mobilePhone` and the phone array are always serialized so an update can
/// clear a value the CSV no longer carries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactPayload {
    given_name: String,
    surname: String,
    email_addresses: Vec<EmailAddress>,
    business_phones: Vec<String>,
    mobile_phone: Option<String>,
    department: String,
    job_title: String,
    office_location: String,
}

impl ContactPayload {
    fn from_record(record: &ContactRecord) -> Self {
        Self {
            given_name: record.given_name.clone(),
            surname: record.surname.clone(),
            email_addresses: vec![EmailAddress {
                address: record.email.clone(),
                name: Some(record.display_name()),
            }],
            business_phones: record.business_phone.iter().cloned().collect(),
            mobile_phone: record.mobile.clone(),
            department: record.department.clone(),
            job_title: record.job_title.clone(),
            office_location: record.office_location.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedContact {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ContactFolder {
    id: String,
    #[serde(rename = "displayName")]
    display_name: String,
}

/// Directory client reconciling a named contact folder in one mailbox.
#[derive(Debug)]
pub struct GraphDirectoryClient {
    config: GraphConfig,
    client: GraphClient,
    /// Folder id resolved on first use and cached for the process lifetime.
    folder_id: Arc<Mutex<Option<String>>>,
}

impl GraphDirectoryClient {
    /// Creates a client after validating configuration and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Config`] for invalid configuration.
    pub fn new(config: GraphConfig, credentials: GraphCredentials) -> GraphResult<Self> {
        config.validate()?;
        credentials.validate()?;

        let token_cache = Arc::new(TokenCache::new(&config, credentials));
        let client = GraphClient::new(token_cache, config.timeout_secs, config.max_retries)?;

        Ok(Self {
            config,
            client,
            folder_id: Arc::new(Mutex::new(None)),
        })
    }

    fn mailbox_url(&self) -> String {
        format!(
            "{}/users/{}",
            self.config.base_url(),
            urlencoding::encode(&self.config.target_mailbox)
        )
    }

    /// Returns the configured folder's id, creating the folder if absent.
    #[instrument(skip(self))]
    async fn folder_id(&self) -> GraphResult<String> {
        let mut cached = self.folder_id.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let url = format!("{}/contactFolders?$top=100", self.mailbox_url());
        let folders: Vec<ContactFolder> = self.client.get_all_pages(&url).await?;

        if let Some(folder) = folders
            .into_iter()
            .find(|f| f.display_name == self.config.folder_name)
        {
            debug!("resolved contact folder '{}'", self.config.folder_name);
            *cached = Some(folder.id.clone());
            return Ok(folder.id);
        }

        info!("contact folder '{}' not found, creating it", self.config.folder_name);
        let body = serde_json::json!({ "displayName": self.config.folder_name });
        let created: ContactFolder = self
            .client
            .post(&format!("{}/contactFolders", self.mailbox_url()), &body)
            .await
            .map_err(|e| GraphError::Folder(e.to_string()))?;

        *cached = Some(created.id.clone());
        Ok(created.id)
    }

    async fn contacts_url(&self) -> GraphResult<String> {
        let folder_id = self.folder_id().await?;
        Ok(format!("{}/contactFolders/{}/contacts", self.mailbox_url(), folder_id))
    }

    async fn list_impl(&self) -> GraphResult<Vec<DirectoryEntry>> {
        let url = format!(
            "{}?$select={}&$top={}",
            self.contacts_url().await?,
            CONTACT_SELECT_FIELDS,
            self.config.page_size
        );
        let contacts: Vec<GraphContact> = self.client.get_all_pages(&url).await?;
        info!("listed {} contacts from folder", contacts.len());
        Ok(contacts.into_iter().map(GraphContact::into_entry).collect())
    }

    async fn create_impl(&self, record: &ContactRecord) -> GraphResult<String> {
        let payload = ContactPayload::from_record(record);
        let created: CreatedContact = self
            .client
            .post(&self.contacts_url().await?, &payload)
            .await?;
        debug!("created contact {} as {}", record.email, created.id);
        Ok(created.id)
    }

    async fn update_impl(&self, remote_id: &str, record: &ContactRecord) -> GraphResult<()> {
        let payload = ContactPayload::from_record(record);
        let url = format!("{}/{}", self.contacts_url().await?, remote_id);
        self.client.patch(&url, &payload).await?;
        debug!("updated contact {remote_id}");
        Ok(())
    }

    async fn delete_impl(&self, remote_id: &str) -> GraphResult<()> {
        let url = format!("{}/{}", self.contacts_url().await?, remote_id);
        self.client.delete(&url).await?;
        debug!("deleted contact {remote_id}");
        Ok(())
    }
}

#[async_trait]
impl DirectoryClient for GraphDirectoryClient {
    async fn list_contacts(&self) -> SyncResult<Vec<DirectoryEntry>> {
        self.list_impl().await.map_err(GraphError::into_load_failure)
    }

    async fn create(&self, record: &ContactRecord) -> SyncResult<String> {
        Ok(self.create_impl(record).await?)
    }

    async fn update(&self, remote_id: &str, record: &ContactRecord) -> SyncResult<()> {
        Ok(self.update_impl(remote_id, record).await?)
    }

    async fn delete(&self, remote_id: &str) -> SyncResult<()> {
        Ok(self.delete_impl(remote_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ContactRecord {
        ContactRecord {
            email: "ada@example.com".to_string(),
            given_name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            business_phone: Some("+1 555 0100".to_string()),
            mobile: None,
            department: "Engineering".to_string(),
            job_title: "Analyst".to_string(),
            office_location: "London".to_string(),
            remote_id: None,
        }
    }

    #[test]
    fn test_payload_shape_matches_graph_schema() {
        let payload = ContactPayload::from_record(&record());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["givenName"], "Ada");
        assert_eq!(json["surname"], "Lovelace");
        assert_eq!(json["emailAddresses"][0]["address"], "ada@example.com");
        assert_eq!(json["emailAddresses"][0]["name"], "Ada Lovelace");
        assert_eq!(json["businessPhones"][0], "+1 555 0100");
        // Absent mobile serializes as null so an update clears it remotely.
        assert!(json["mobilePhone"].is_null());
        assert_eq!(json["officeLocation"], "London");
    }

    #[test]
    fn test_payload_without_business_phone_sends_empty_array() {
        let mut r = record();
        r.business_phone = None;
        let json = serde_json::to_value(ContactPayload::from_record(&r)).unwrap();
        assert_eq!(json["businessPhones"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_graph_contact_maps_to_entry() {
        let json = serde_json::json!({
            "id": "AAMk123",
            "givenName": "Grace",
            "surname": "Hopper",
            "emailAddresses": [{"address": "grace@example.com", "name": "Grace Hopper"}],
            "businessPhones": ["+1 555 0101"],
            "mobilePhone": null,
            "department": "Engineering",
            "jobTitle": "Rear Admiral",
            "officeLocation": "Arlington"
        });

        let contact: GraphContact = serde_json::from_value(json).unwrap();
        let entry = contact.into_entry();
        assert_eq!(entry.remote_id, "AAMk123");
        assert_eq!(entry.email.as_deref(), Some("grace@example.com"));
        assert_eq!(entry.business_phone.as_deref(), Some("+1 555 0101"));
        assert!(entry.mobile.is_none());
    }

    #[test]
    fn test_contact_without_email_addresses_maps_to_none() {
        let json = serde_json::json!({
            "id": "AAMk456",
            "givenName": "Nameless",
            "surname": "Contact"
        });

        let contact: GraphContact = serde_json::from_value(json).unwrap();
        let entry = contact.into_entry();
        assert!(entry.email.is_none());
        assert!(entry.business_phone.is_none());
    }

    #[test]
    fn test_blank_business_phone_entry_is_skipped() {
        let json = serde_json::json!({
            "id": "AAMk789",
            "businessPhones": ["", "+1 555 0102"]
        });

        let contact: GraphContact = serde_json::from_value(json).unwrap();
        let entry = contact.into_entry();
        assert_eq!(entry.business_phone.as_deref(), Some("+1 555 0102"));
    }
}
