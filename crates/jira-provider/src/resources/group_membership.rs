//! `jira_group_membership` resource.
//!
//! Ids have the form `{account_id}/{group}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::group::GROUP_API_ENDPOINT;
use super::traits::Resource;
use crate::client::JiraClient;
use crate::error::ProviderError;
use crate::models::{GroupMembershipRequest, UserGroups};

/// User lookup on API v3, which can expand group membership.
const USER_V3_API_ENDPOINT: &str = "/rest/api/3/user";

/// Persisted state of a group membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembershipState {
    /// `{account_id}/{group}` (computed).
    #[serde(default)]
    pub id: String,
    /// Member account id. Changing it replaces the membership.
    pub account_id: String,
    /// Group name. Changing it replaces the membership.
    pub group: String,
}

impl GroupMembershipState {
    /// Build the state for an account and group.
    #[must_use]
    pub fn new(account_id: impl Into<String>, group: impl Into<String>) -> Self {
        let account_id = account_id.into();
        let group = group.into();
        Self {
            id: format!("{account_id}/{group}"),
            account_id,
            group,
        }
    }

    /// Split an `{account_id}/{group}` id. Group names may contain `/`.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidId`] when either part is missing.
    pub fn parse_id(id: &str) -> Result<Self, ProviderError> {
        match id.split_once('/') {
            Some((account_id, group)) if !account_id.is_empty() && !group.is_empty() => {
                Ok(Self::new(account_id, group))
            }
            _ => Err(ProviderError::InvalidId(format!(
                "expected '<account_id>/<group>', got '{id}'"
            ))),
        }
    }
}

/// Jira group membership resource.
#[derive(Clone)]
pub struct GroupMembershipResource {
    client: JiraClient,
}

impl GroupMembershipResource {
    /// Create the resource on top of a Jira client.
    #[must_use]
    pub fn new(client: JiraClient) -> Self {
        Self { client }
    }

    fn membership_endpoint() -> String {
        format!("{GROUP_API_ENDPOINT}/user")
    }
}

#[async_trait]
impl Resource for GroupMembershipResource {
    type State = GroupMembershipState;

    const TYPE_NAME: &'static str = "jira_group_membership";

    #[instrument(skip_all, fields(account_id = %desired.account_id, group = %desired.group))]
    async fn create(
        &self,
        desired: GroupMembershipState,
    ) -> Result<GroupMembershipState, ProviderError> {
        let request = GroupMembershipRequest {
            account_id: desired.account_id.clone(),
        };
        self.client
            .post_empty(
                &Self::membership_endpoint(),
                &[("groupname", desired.group.as_str())],
                &request,
            )
            .await?;
        info!(account_id = %desired.account_id, group = %desired.group, "Added group member");

        let state = GroupMembershipState::new(desired.account_id, desired.group);
        let id = state.id.clone();
        Resource::read(self, state)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("group membership {id}")))
    }

    #[instrument(skip_all, fields(membership = %prior.id))]
    async fn read(
        &self,
        prior: GroupMembershipState,
    ) -> Result<Option<GroupMembershipState>, ProviderError> {
        let state = if prior.id.is_empty() {
            GroupMembershipState::new(prior.account_id, prior.group)
        } else {
            GroupMembershipState::parse_id(&prior.id)?
        };

        let user: UserGroups = self
            .client
            .get_query(
                USER_V3_API_ENDPOINT,
                &[("accountId", state.account_id.as_str()), ("expand", "groups")],
            )
            .await?;

        if user.groups.items.iter().any(|g| g.name == state.group) {
            Ok(Some(state))
        } else {
            Err(ProviderError::MembershipNotFound {
                account_id: state.account_id,
                group: state.group,
            })
        }
    }

    async fn update(
        &self,
        prior: GroupMembershipState,
        desired: GroupMembershipState,
    ) -> Result<GroupMembershipState, ProviderError> {
        if prior.account_id != desired.account_id {
            return Err(ProviderError::RequiresReplacement {
                resource: Self::TYPE_NAME,
                attribute: "account_id",
            });
        }
        if prior.group != desired.group {
            return Err(ProviderError::RequiresReplacement {
                resource: Self::TYPE_NAME,
                attribute: "group",
            });
        }
        Ok(prior)
    }

    #[instrument(skip_all, fields(membership = %state.id))]
    async fn delete(&self, state: GroupMembershipState) -> Result<(), ProviderError> {
        self.client
            .delete(
                &Self::membership_endpoint(),
                &[
                    ("accountId", state.account_id.as_str()),
                    ("groupname", state.group.as_str()),
                ],
            )
            .await?;
        info!(account_id = %state.account_id, group = %state.group, "Removed group member");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<GroupMembershipState, ProviderError> {
        let state = GroupMembershipState::parse_id(id)?;
        Resource::read(self, state)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("group membership {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let state = GroupMembershipState::parse_id("5b10ac8d/jira-admins").unwrap();
        assert_eq!(state.account_id, "5b10ac8d");
        assert_eq!(state.group, "jira-admins");
        assert_eq!(state.id, "5b10ac8d/jira-admins");

        let nested = GroupMembershipState::parse_id("abc/team/ops").unwrap();
        assert_eq!(nested.group, "team/ops");
    }

    #[test]
    fn test_parse_id_rejects_malformed() {
        for id in ["no-slash", "/group", "account/", ""] {
            assert!(matches!(
                GroupMembershipState::parse_id(id),
                Err(ProviderError::InvalidId(_))
            ));
        }
    }
}
