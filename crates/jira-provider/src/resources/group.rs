//! `jira_group` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::traits::Resource;
use crate::client::JiraClient;
use crate::error::ProviderError;
use crate::models::{GroupMembersPage, GroupRequest};

/// Group endpoint.
pub(crate) const GROUP_API_ENDPOINT: &str = "/rest/api/2/group";

/// Group member listing, used to check the group exists.
const GROUP_MEMBER_API_ENDPOINT: &str = "/rest/api/2/group/member";

/// Persisted state of a group. The name doubles as the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    /// Group name. Changing it replaces the group.
    pub name: String,
}

/// Jira group resource.
#[derive(Clone)]
pub struct GroupResource {
    client: JiraClient,
}

impl GroupResource {
    /// Create the resource on top of a Jira client.
    #[must_use]
    pub fn new(client: JiraClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for GroupResource {
    type State = GroupState;

    const TYPE_NAME: &'static str = "jira_group";

    #[instrument(skip_all, fields(group = %desired.name))]
    async fn create(&self, desired: GroupState) -> Result<GroupState, ProviderError> {
        let request = GroupRequest {
            name: desired.name.clone(),
        };
        self.client.post_empty(GROUP_API_ENDPOINT, &[], &request).await?;
        info!(group = %desired.name, "Created group");

        let name = desired.name.clone();
        Resource::read(self, desired)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("group {name}")))
    }

    #[instrument(skip_all, fields(group = %prior.name))]
    async fn read(&self, prior: GroupState) -> Result<Option<GroupState>, ProviderError> {
        let page: Result<GroupMembersPage, _> = self
            .client
            .get_query(GROUP_MEMBER_API_ENDPOINT, &[("groupname", prior.name.as_str())])
            .await;

        match page {
            Ok(_) => Ok(Some(prior)),
            Err(ProviderError::NotFound(_)) => {
                info!(group = %prior.name, "Group no longer exists");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        prior: GroupState,
        desired: GroupState,
    ) -> Result<GroupState, ProviderError> {
        if prior.name == desired.name {
            Ok(prior)
        } else {
            Err(ProviderError::RequiresReplacement {
                resource: Self::TYPE_NAME,
                attribute: "name",
            })
        }
    }

    #[instrument(skip_all, fields(group = %state.name))]
    async fn delete(&self, state: GroupState) -> Result<(), ProviderError> {
        self.client
            .delete(GROUP_API_ENDPOINT, &[("groupname", state.name.as_str())])
            .await?;
        info!(group = %state.name, "Deleted group");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<GroupState, ProviderError> {
        Resource::read(
            self,
            GroupState {
                name: id.to_string(),
            },
        )
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("group {id}")))
    }
}
