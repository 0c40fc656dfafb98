//! Jira REST API request and response models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Shared references
// ============================================================================

/// Reference by name (issue type, user on Jira v2).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameRef {
    /// Name.
    #[serde(default)]
    pub name: String,
}

/// Reference by key (project).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyRef {
    /// Key.
    #[serde(default)]
    pub key: String,
}

/// Reference by id (parent, status, transition).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRef {
    /// Id.
    #[serde(default)]
    pub id: String,
}

// ============================================================================
// Issue types
// ============================================================================

/// Issue fields sent on create and update.
///
/// Unset fields are omitted so an update only touches what changed. Custom
/// fields are flattened next to the standard ones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueFieldsInput {
    /// Summary line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Issue type by name.
    #[serde(rename = "issuetype", skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<NameRef>,
    /// Project by key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<KeyRef>,
    /// Assignee by user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<NameRef>,
    /// Reporter by user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<NameRef>,
    /// Parent issue by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<IdRef>,
    /// Labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Custom fields (`customfield_*`).
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl IssueFieldsInput {
    /// Whether nothing would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.issue_type.is_none()
            && self.project.is_none()
            && self.assignee.is_none()
            && self.reporter.is_none()
            && self.parent.is_none()
            && self.labels.is_none()
            && self.custom.is_empty()
    }
}

/// Body of a create or update request.
#[derive(Debug, Serialize)]
pub struct IssueInput {
    /// Fields to set.
    pub fields: IssueFieldsInput,
}

/// Response to an issue create.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    /// Issue id.
    pub id: String,
    /// Issue key (e.g. "PROJ-1").
    pub key: String,
}

/// Issue as returned by `GET /rest/api/2/issue/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    /// Issue id.
    pub id: String,
    /// Issue key.
    pub key: String,
    /// Issue fields.
    pub fields: IssueFields,
}

/// Issue fields as returned by Jira.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    /// Summary line.
    #[serde(default)]
    pub summary: String,
    /// Description (null when empty).
    #[serde(default)]
    pub description: Option<String>,
    /// Issue type.
    #[serde(default, rename = "issuetype")]
    pub issue_type: NameRef,
    /// Project.
    #[serde(default)]
    pub project: KeyRef,
    /// Assignee.
    #[serde(default)]
    pub assignee: Option<NameRef>,
    /// Reporter.
    #[serde(default)]
    pub reporter: Option<NameRef>,
    /// Parent issue.
    #[serde(default)]
    pub parent: Option<ParentRef>,
    /// Workflow status.
    #[serde(default)]
    pub status: IdRef,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Every other field, including custom fields.
    #[serde(flatten)]
    pub unknowns: Map<String, Value>,
}

/// Parent issue reference in a read response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParentRef {
    /// Parent id.
    #[serde(default)]
    pub id: String,
    /// Parent key.
    #[serde(default)]
    pub key: String,
}

/// Body of `POST /rest/api/2/issue/{id}/transitions`.
#[derive(Debug, Serialize)]
pub struct TransitionRequest {
    /// Transition to apply.
    pub transition: IdRef,
}

// ============================================================================
// User types
// ============================================================================

/// Body of `POST /rest/api/2/user`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
    /// Email address.
    pub email_address: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Jira user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Atlassian account id.
    pub account_id: String,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
    /// Email address (hidden by privacy settings for most accounts).
    #[serde(default)]
    pub email_address: Option<String>,
    /// Whether the account is active.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Response of `GET /rest/api/2/groupuserpicker`.
#[derive(Debug, Deserialize)]
pub struct UserPickerResponse {
    /// Matching users.
    pub users: PickedUsers,
}

/// Users section of a picker response.
#[derive(Debug, Deserialize)]
pub struct PickedUsers {
    /// Total matches.
    #[serde(default)]
    pub total: u64,
    /// First page of matches.
    #[serde(default)]
    pub users: Vec<PickedUser>,
}

/// Single picker match.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedUser {
    /// Atlassian account id.
    pub account_id: String,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
}

// ============================================================================
// Group types
// ============================================================================

/// Body of `POST /rest/api/2/group`.
#[derive(Debug, Serialize)]
pub struct GroupRequest {
    /// Group name.
    pub name: String,
}

/// Page of `GET /rest/api/2/group/member`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembersPage {
    /// Total members.
    #[serde(default)]
    pub total: u64,
}

/// Body of `POST /rest/api/2/group/user`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembershipRequest {
    /// Account to add.
    pub account_id: String,
}

/// `GET /rest/api/3/user?expand=groups` response.
#[derive(Debug, Deserialize)]
pub struct UserGroups {
    /// Groups the user belongs to.
    #[serde(default)]
    pub groups: GroupList,
}

/// Group listing.
#[derive(Debug, Default, Deserialize)]
pub struct GroupList {
    /// Groups.
    #[serde(default)]
    pub items: Vec<NameRef>,
}
