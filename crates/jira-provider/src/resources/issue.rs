//! `jira_issue` resource.
//!
//! Standard fields map one to one onto the issue. Custom fields are declared
//! as strings and go through [`crate::reconcile`] on every read so only the
//! declared parts of structured values end up in state.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::traits::Resource;
use crate::client::JiraClient;
use crate::error::ProviderError;
use crate::models::{
    CreatedIssue, IdRef, Issue, IssueFieldsInput, IssueInput, KeyRef, NameRef, TransitionRequest,
};
use crate::reconcile::{decode_declared_fields, reconcile};

/// Issue collection endpoint.
const ISSUE_API_ENDPOINT: &str = "/rest/api/2/issue";

/// Persisted state of a Jira issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueState {
    /// Issue id (computed).
    #[serde(default)]
    pub id: String,
    /// Issue key, e.g. `OPS-12` (computed).
    #[serde(default)]
    pub issue_key: String,
    /// Assignee user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Reporter user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    /// Custom fields as declared strings (JSON or literal).
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Issue type name.
    #[serde(default)]
    pub issue_type: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Summary line.
    #[serde(default)]
    pub summary: String,
    /// Project key.
    #[serde(default)]
    pub project_key: String,
    /// Parent issue id or key. Changing it replaces the issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Workflow status id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Transition applied when `state` differs from the current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_transition: Option<String>,
    /// Transition applied instead of deleting the issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_transition: Option<String>,
}

/// Jira issue resource.
#[derive(Clone)]
pub struct IssueResource {
    client: JiraClient,
}

impl IssueResource {
    /// Create the resource on top of a Jira client.
    #[must_use]
    pub fn new(client: JiraClient) -> Self {
        Self { client }
    }

    async fn get_issue(&self, id: &str) -> Result<Issue, ProviderError> {
        self.client.get(&format!("{ISSUE_API_ENDPOINT}/{id}")).await
    }

    async fn do_transition(&self, id: &str, transition: &str) -> Result<(), ProviderError> {
        info!(issue_id = %id, transition = %transition, "Transitioning issue");
        let body = TransitionRequest {
            transition: IdRef {
                id: transition.to_string(),
            },
        };
        self.client
            .post_empty(&format!("{ISSUE_API_ENDPOINT}/{id}/transitions"), &[], &body)
            .await
    }

    /// Move the issue to the desired status when it is not there yet.
    async fn transition_if_needed(
        &self,
        issue: &Issue,
        desired: &IssueState,
    ) -> Result<(), ProviderError> {
        if !state_changed(&issue.fields.status.id, desired.state.as_deref()) {
            return Ok(());
        }
        match non_empty(desired.state_transition.as_ref()) {
            Some(transition) => self.do_transition(&issue.id, &transition).await,
            None => {
                debug!(
                    issue_id = %issue.id,
                    "Status differs but no state_transition is configured"
                );
                Ok(())
            }
        }
    }

    async fn read_required(&self, state: IssueState) -> Result<IssueState, ProviderError> {
        let id = state.id.clone();
        Resource::read(self, state)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("issue {id}")))
    }
}

#[async_trait]
impl Resource for IssueResource {
    type State = IssueState;

    const TYPE_NAME: &'static str = "jira_issue";

    #[instrument(skip_all, fields(project = %desired.project_key))]
    async fn create(&self, desired: IssueState) -> Result<IssueState, ProviderError> {
        let input = IssueInput {
            fields: create_fields(&desired),
        };
        let created: CreatedIssue = self.client.post(ISSUE_API_ENDPOINT, &[], &input).await?;
        info!(issue_id = %created.id, issue_key = %created.key, "Created issue");

        let issue = self.get_issue(&created.id).await?;
        self.transition_if_needed(&issue, &desired).await?;

        let mut state = desired;
        state.id = created.id;
        self.read_required(state).await
    }

    #[instrument(skip_all, fields(issue_id = %prior.id))]
    async fn read(&self, prior: IssueState) -> Result<Option<IssueState>, ProviderError> {
        let issue = match self.get_issue(&prior.id).await {
            Ok(issue) => issue,
            Err(ProviderError::NotFound(_)) => {
                info!(issue_id = %prior.id, "Issue no longer exists");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        apply_issue(prior, &issue).map(Some)
    }

    #[instrument(skip_all, fields(issue_id = %prior.id))]
    async fn update(
        &self,
        prior: IssueState,
        desired: IssueState,
    ) -> Result<IssueState, ProviderError> {
        if prior.parent.as_deref().unwrap_or_default()
            != desired.parent.as_deref().unwrap_or_default()
        {
            return Err(ProviderError::RequiresReplacement {
                resource: Self::TYPE_NAME,
                attribute: "parent",
            });
        }

        let fields = update_fields(&prior, &desired);
        if fields.is_empty() {
            debug!(issue_id = %prior.id, "No field changes to send");
        } else {
            self.client
                .put_empty(
                    &format!("{ISSUE_API_ENDPOINT}/{}", prior.id),
                    &IssueInput { fields },
                )
                .await?;
            info!(issue_id = %prior.id, "Updated issue");
        }

        let issue = self.get_issue(&prior.id).await?;
        self.transition_if_needed(&issue, &desired).await?;

        let mut state = desired;
        state.id = prior.id;
        state.issue_key = prior.issue_key;
        self.read_required(state).await
    }

    #[instrument(skip_all, fields(issue_id = %state.id))]
    async fn delete(&self, state: IssueState) -> Result<(), ProviderError> {
        if let Some(transition) = non_empty(state.delete_transition.as_ref()) {
            return self.do_transition(&state.id, &transition).await;
        }

        self.client
            .delete(&format!("{ISSUE_API_ENDPOINT}/{}", state.id), &[])
            .await?;
        info!(issue_id = %state.id, "Deleted issue");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<IssueState, ProviderError> {
        self.read_required(IssueState {
            id: id.to_string(),
            ..IssueState::default()
        })
        .await
    }
}

/// Fields sent when creating an issue.
fn create_fields(desired: &IssueState) -> IssueFieldsInput {
    IssueFieldsInput {
        summary: Some(desired.summary.clone()),
        description: Some(desired.description.clone()).filter(|d| !d.is_empty()),
        issue_type: Some(NameRef {
            name: desired.issue_type.clone(),
        }),
        project: Some(KeyRef {
            key: desired.project_key.clone(),
        }),
        assignee: non_empty(desired.assignee.as_ref()).map(|name| NameRef { name }),
        reporter: non_empty(desired.reporter.as_ref()).map(|name| NameRef { name }),
        parent: non_empty(desired.parent.as_ref()).map(|id| IdRef { id }),
        labels: Some(desired.labels.clone()).filter(|l| !l.is_empty()),
        custom: decode_declared_fields(&desired.fields),
    }
}

/// Fields sent when updating an issue: only what changed.
fn update_fields(prior: &IssueState, desired: &IssueState) -> IssueFieldsInput {
    let mut fields = IssueFieldsInput::default();

    if prior.issue_type != desired.issue_type {
        fields.issue_type = Some(NameRef {
            name: desired.issue_type.clone(),
        });
    }
    if prior.description != desired.description {
        fields.description = Some(desired.description.clone());
    }
    if prior.summary != desired.summary {
        fields.summary = Some(desired.summary.clone());
    }
    if prior.project_key != desired.project_key {
        fields.project = Some(KeyRef {
            key: desired.project_key.clone(),
        });
    }
    if assignee_changed(prior.assignee.as_deref(), desired.assignee.as_deref()) {
        fields.assignee = non_empty(desired.assignee.as_ref()).map(|name| NameRef { name });
    }
    if reporter_changed(prior.reporter.as_deref(), desired.reporter.as_deref()) {
        fields.reporter = non_empty(desired.reporter.as_ref()).map(|name| NameRef { name });
    }
    if prior.labels != desired.labels {
        fields.labels = Some(desired.labels.clone());
    }
    if prior.fields != desired.fields {
        fields.custom = decode_declared_fields(&desired.fields);
    }

    fields
}

/// Fold a fetched issue into state.
///
/// Custom fields are only reconciled when the state declares some; entries
/// Jira did not report keep their previous value.
fn apply_issue(mut state: IssueState, issue: &Issue) -> Result<IssueState, ProviderError> {
    let fields = &issue.fields;

    state.id.clone_from(&issue.id);
    state.issue_key.clone_from(&issue.key);

    if let Some(assignee) = &fields.assignee {
        state.assignee = Some(assignee.name.clone());
    }
    if let Some(reporter) = &fields.reporter {
        state.reporter = Some(reporter.name.clone());
    }
    if let Some(parent) = &fields.parent {
        // Keep whichever form (id or key) the parent was declared with.
        let declared = state.parent.as_deref();
        if declared != Some(parent.id.as_str()) && declared != Some(parent.key.as_str()) {
            state.parent = Some(parent.key.clone());
        }
    }

    if !state.fields.is_empty() {
        let reconciled = reconcile(&state.fields, &fields.unknowns)?;
        state.fields.extend(reconciled);
    }

    state.labels.clone_from(&fields.labels);
    state.issue_type.clone_from(&fields.issue_type.name);
    if let Some(description) = fields.description.as_ref().filter(|d| !d.is_empty()) {
        state.description.clone_from(description);
    }
    state.summary.clone_from(&fields.summary);
    state.project_key.clone_from(&fields.project.key);
    if !fields.status.id.is_empty() {
        state.state = Some(fields.status.id.clone());
    }

    Ok(state)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// User names are case-insensitive in Jira.
fn assignee_changed(prior: Option<&str>, desired: Option<&str>) -> bool {
    !eq_ignore_case(prior.unwrap_or_default(), desired.unwrap_or_default())
}

/// An empty reporter means "whoever Jira picked", never a change.
fn reporter_changed(prior: Option<&str>, desired: Option<&str>) -> bool {
    let desired = desired.unwrap_or_default();
    !desired.is_empty() && !eq_ignore_case(prior.unwrap_or_default(), desired)
}

/// An empty desired state means "leave the workflow alone".
fn state_changed(current: &str, desired: Option<&str>) -> bool {
    matches!(desired, Some(state) if !state.is_empty() && state != current)
}
