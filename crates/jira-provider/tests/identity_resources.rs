//! Integration tests for users, groups and group memberships.

use jira_provider::{
    AdminClient, GroupMembershipResource, GroupMembershipState, GroupResource, GroupState,
    JiraClient, ProviderError, Resource, UserResource, UserState,
};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jira(server: &MockServer) -> JiraClient {
    JiraClient::new(&server.uri(), "bot@example.com", "api-token").unwrap()
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_create_keeps_declared_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/user"))
        .and(body_json(json!({
            "emailAddress": "carol@example.com",
            "displayName": "Carol"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accountId": "acc-1",
            "displayName": "Carol",
            "active": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/user"))
        .and(query_param("accountId", "acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "acc-1",
            "displayName": "Carol",
            "active": true
        })))
        .mount(&server)
        .await;

    let users = UserResource::new(jira(&server), None);
    let state = users
        .create(UserState {
            email: "carol@example.com".into(),
            display_name: Some("Carol".into()),
            ..UserState::default()
        })
        .await
        .unwrap();

    assert_eq!(state.id, "acc-1");
    assert_eq!(state.account_id, "acc-1");
    assert_eq!(state.email, "carol@example.com");
    assert!(state.active);
}

#[tokio::test]
async fn test_user_import_by_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/groupuserpicker"))
        .and(query_param("query", "carol@example.com"))
        .and(query_param("showAvatar", "false"))
        .and(query_param("excludedConnectAddons", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": {
                "total": 1,
                "users": [{ "accountId": "acc-1", "displayName": "Carol" }]
            },
            "groups": { "total": 0, "groups": [] }
        })))
        .mount(&server)
        .await;

    let users = UserResource::new(jira(&server), None);
    let state = users.import("carol@example.com").await.unwrap();

    assert_eq!(state.id, "acc-1");
    assert_eq!(state.account_id, "acc-1");
    assert_eq!(state.email, "carol@example.com");
    assert_eq!(state.display_name.as_deref(), Some("Carol"));
}

#[tokio::test]
async fn test_user_import_by_email_requires_exact_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/groupuserpicker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": {
                "total": 2,
                "users": [
                    { "accountId": "acc-1", "displayName": "Carol" },
                    { "accountId": "acc-2", "displayName": "Caroline" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let users = UserResource::new(jira(&server), None);
    let err = users.import("carol@example.com").await.unwrap_err();
    assert!(matches!(err, ProviderError::AmbiguousUser { total: 2, .. }));
}

#[tokio::test]
async fn test_user_deactivate_uses_admin_api() {
    let jira_server = MockServer::start().await;
    let admin_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/acc-1/manage/lifecycle/disable"))
        .and(bearer_token("admin-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&admin_server)
        .await;

    let admin = AdminClient::with_base_url(&admin_server.uri(), "admin-token").unwrap();
    let users = UserResource::new(jira(&jira_server), Some(admin));

    let prior = UserState {
        id: "acc-1".into(),
        account_id: "acc-1".into(),
        email: "carol@example.com".into(),
        display_name: Some("Carol".into()),
        active: true,
    };
    let desired = UserState {
        active: false,
        ..prior.clone()
    };

    let state = users.update(prior, desired).await.unwrap();
    assert!(!state.active);
}

#[tokio::test]
async fn test_user_lifecycle_needs_admin_token() {
    let server = MockServer::start().await;
    let users = UserResource::new(jira(&server), None);

    let prior = UserState {
        id: "acc-1".into(),
        email: "carol@example.com".into(),
        ..UserState::default()
    };
    let desired = UserState {
        active: false,
        ..prior.clone()
    };

    let err = users.update(prior, desired).await.unwrap_err();
    assert!(matches!(err, ProviderError::Config(_)));
}

#[tokio::test]
async fn test_user_email_change_requires_replacement() {
    let server = MockServer::start().await;
    let users = UserResource::new(jira(&server), None);

    let prior = UserState {
        id: "acc-1".into(),
        email: "carol@example.com".into(),
        ..UserState::default()
    };
    let desired = UserState {
        email: "carol@new.example.com".into(),
        ..prior.clone()
    };

    let err = users.update(prior, desired).await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::RequiresReplacement {
            attribute: "email",
            ..
        }
    ));
}

#[tokio::test]
async fn test_user_delete() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/2/user"))
        .and(query_param("accountId", "acc-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let users = UserResource::new(jira(&server), None);
    users
        .delete(UserState {
            id: "acc-1".into(),
            ..UserState::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_admin_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/acc-1/manage/lifecycle/enable"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let admin = AdminClient::with_base_url(&server.uri(), "admin-token").unwrap();
    let err = admin.set_user_lifecycle("acc-1", true).await.unwrap_err();
    assert!(matches!(err, ProviderError::Api { status: 403, .. }));
}

// =============================================================================
// Groups
// =============================================================================

#[tokio::test]
async fn test_group_create_and_read() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/group"))
        .and(body_json(json!({ "name": "release-managers" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "release-managers",
            "groupId": "g-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/group/member"))
        .and(query_param("groupname", "release-managers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isLast": true,
            "maxResults": 50,
            "startAt": 0,
            "total": 0,
            "values": []
        })))
        .mount(&server)
        .await;

    let groups = GroupResource::new(jira(&server));
    let state = groups
        .create(GroupState {
            name: "release-managers".into(),
        })
        .await
        .unwrap();
    assert_eq!(state.name, "release-managers");
}

#[tokio::test]
async fn test_group_read_missing_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/group/member"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let groups = GroupResource::new(jira(&server));
    let state = groups
        .read(GroupState {
            name: "gone".into(),
        })
        .await
        .unwrap();
    assert!(state.is_none());
}

#[tokio::test]
async fn test_group_delete() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/2/group"))
        .and(query_param("groupname", "release-managers"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let groups = GroupResource::new(jira(&server));
    groups
        .delete(GroupState {
            name: "release-managers".into(),
        })
        .await
        .unwrap();
}

// =============================================================================
// Group memberships
// =============================================================================

async fn mount_user_groups(server: &MockServer, groups: &[&str]) {
    let items: Vec<_> = groups.iter().map(|name| json!({ "name": name })).collect();
    Mock::given(method("GET"))
        .and(path("/rest/api/3/user"))
        .and(query_param("accountId", "acc-1"))
        .and(query_param("expand", "groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "acc-1",
            "groups": { "size": items.len(), "items": items }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_membership_create() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/group/user"))
        .and(query_param("groupname", "release-managers"))
        .and(body_json(json!({ "accountId": "acc-1" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "name": "release-managers" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_user_groups(&server, &["jira-users", "release-managers"]).await;

    let memberships = GroupMembershipResource::new(jira(&server));
    let state = memberships
        .create(GroupMembershipState {
            account_id: "acc-1".into(),
            group: "release-managers".into(),
            ..GroupMembershipState::default()
        })
        .await
        .unwrap();

    assert_eq!(state.id, "acc-1/release-managers");
}

#[tokio::test]
async fn test_membership_read_reports_missing_group() {
    let server = MockServer::start().await;
    mount_user_groups(&server, &["jira-users"]).await;

    let memberships = GroupMembershipResource::new(jira(&server));
    let err = memberships
        .import("acc-1/release-managers")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProviderError::MembershipNotFound { ref group, .. } if group == "release-managers"
    ));
}

#[tokio::test]
async fn test_membership_import_rejects_bad_id() {
    let server = MockServer::start().await;
    let memberships = GroupMembershipResource::new(jira(&server));

    let err = memberships.import("acc-1").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidId(_)));
}

#[tokio::test]
async fn test_membership_delete() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/2/group/user"))
        .and(query_param("accountId", "acc-1"))
        .and(query_param("groupname", "release-managers"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let memberships = GroupMembershipResource::new(jira(&server));
    memberships
        .delete(GroupMembershipState::new("acc-1", "release-managers"))
        .await
        .unwrap();
}
