//! Registry dispatch over JSON state documents.

use jira_provider::{DynResource, JiraClient, Provider, ProviderError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_registry_refreshes_issue_state_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "10001",
            "key": "OPS-7",
            "fields": {
                "summary": "Rotate credentials",
                "issuetype": { "name": "Task" },
                "project": { "key": "OPS" },
                "status": { "id": "1" },
                "labels": [],
                "customfield_10010": { "epic": { "id": "10001", "name": "Epic One", "extra": "x" } }
            }
        })))
        .mount(&server)
        .await;

    let client = JiraClient::new(&server.uri(), "bot", "token").unwrap();
    let provider = Provider::with_clients(client, None);

    let refreshed = provider
        .resource("jira_issue")
        .unwrap()
        .read(json!({
            "id": "10001",
            "summary": "stale",
            "fields": { "customfield_10010": "{\"epic\":{\"id\":\"\",\"name\":\"\"}}" }
        }))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(refreshed["summary"], "Rotate credentials");
    assert_eq!(refreshed["issue_key"], "OPS-7");
    assert_eq!(
        refreshed["fields"]["customfield_10010"],
        r#"{"epic":{"id":"10001","name":"Epic One"}}"#
    );
}

#[tokio::test]
async fn test_registry_rejects_malformed_state_document() {
    let server = MockServer::start().await;
    let client = JiraClient::new(&server.uri(), "bot", "token").unwrap();
    let provider = Provider::with_clients(client, None);

    let err = provider
        .resource("jira_group")
        .unwrap()
        .read(json!({ "name": 42 }))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Serialization(_)));
}
