//! Integration tests for the Graph directory client against a mock server.

use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirsync_engine::{ContactRecord, DirectoryClient};
use dirsync_graph::{GraphConfig, GraphCredentials, GraphDirectoryClient};

const TENANT: &str = "tenant-1";
const MAILBOX_PATH: &str = "/v1.0/users/sync%40example.com";

fn test_client(server: &MockServer) -> GraphDirectoryClient {
    let config = GraphConfig::new(TENANT, "sync@example.com")
        .with_endpoints(server.uri(), server.uri());
    let credentials = GraphCredentials::new("client-1", "secret-1");
    GraphDirectoryClient::new(config, credentials).unwrap()
}

async fn mock_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/{TENANT}/oauth2/v2.0/token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

async fn mock_folder_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"id": "folder-other", "displayName": "Contacts"},
                {"id": "folder-1", "displayName": "Work Contacts"}
            ]
        })))
        .mount(server)
        .await;
}

fn record(email: &str) -> ContactRecord {
    ContactRecord {
        email: email.to_string(),
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

#[tokio::test]
async fn test_list_contacts_resolves_folder_and_follows_pagination() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    mock_folder_listing(&server).await;

    let contacts_path = format!("{MAILBOX_PATH}/contactFolders/folder-1/contacts");

    // Second page, matched by the skiptoken carried in @odata.nextLink.
    Mock::given(method("GET"))
        .and(path(contacts_path.clone()))
        .and(query_param("$skiptoken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {
                    "id": "c-2",
                    "givenName": "Grace",
                    "surname": "Hopper",
                    "emailAddresses": [{"address": "grace@example.com"}]
                }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(contacts_path.clone()))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "@odata.nextLink":
                format!("{}{}?$skiptoken=page2", server.uri(), contacts_path),
            "value": [
                {
                    "id": "c-1",
                    "givenName": "Ada",
                    "surname": "Lovelace",
                    "emailAddresses": [{"address": "ada@example.com"}],
                    "businessPhones": ["+1 555 0100"]
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let entries = client.list_contacts().await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].remote_id, "c-1");
    assert_eq!(entries[0].email.as_deref(), Some("ada@example.com"));
    assert_eq!(entries[1].remote_id, "c-2");
}

#[tokio::test]
async fn test_missing_folder_is_created() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": []})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders")))
        .and(body_partial_json(serde_json::json!({"displayName": "Work Contacts"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "folder-new",
            "displayName": "Work Contacts"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders/folder-new/contacts")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": []})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let entries = client.list_contacts().await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_create_posts_payload_and_returns_id() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    mock_folder_listing(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders/folder-1/contacts")))
        .and(body_partial_json(serde_json::json!({
            "givenName": "Ada",
            "surname": "Lovelace",
            "emailAddresses": [{"address": "ada@example.com"}],
            "businessPhones": ["+1 555 0100"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "c-new"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let id = client.create(&record("ada@example.com")).await.unwrap();
    assert_eq!(id, "c-new");
}

#[tokio::test]
async fn test_update_and_delete_hit_the_contact_resource() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    mock_folder_listing(&server).await;

    Mock::given(method("PATCH"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders/folder-1/contacts/c-1")))
        .and(body_partial_json(serde_json::json!({"jobTitle": "Analyst"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders/folder-1/contacts/c-2")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.update("c-1", &record("ada@example.com")).await.unwrap();
    client.delete("c-2").await.unwrap();
}

#[tokio::test]
async fn test_throttled_request_is_retried() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders")))
        .respond_with(
            ResponseTemplate::new(429).insert_header("Retry-After", "0"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    mock_folder_listing(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders/folder-1/contacts")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": []})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let entries = client.list_contacts().await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_token_is_cached_across_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{TENANT}/oauth2/v2.0/token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    mock_folder_listing(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders/folder-1/contacts")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": []})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.list_contacts().await.unwrap();
    client.list_contacts().await.unwrap();
}

#[tokio::test]
async fn test_api_error_surfaces_code_and_message() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{MAILBOX_PATH}/contactFolders")))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {
                "code": "ErrorAccessDenied",
                "message": "Access is denied"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.list_contacts().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("ErrorAccessDenied"), "unexpected error: {message}");
}
