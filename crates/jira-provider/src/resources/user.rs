//! `jira_user` resource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::traits::Resource;
use crate::client::{AdminClient, JiraClient};
use crate::error::ProviderError;
use crate::models::{User, UserCreateRequest, UserPickerResponse};

/// User endpoint.
const USER_API_ENDPOINT: &str = "/rest/api/2/user";

/// Combined user and group search, used to resolve an email to an account.
const USER_PICKER_API_ENDPOINT: &str = "/rest/api/2/groupuserpicker";

/// Persisted state of an Atlassian account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    /// Account id, or an email address right after an import by email.
    #[serde(default)]
    pub id: String,
    /// Atlassian account id (computed).
    #[serde(default)]
    pub account_id: String,
    /// Email address. Changing it replaces the user.
    #[serde(default)]
    pub email: String,
    /// Display name. Changing it replaces the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Whether the account is enabled.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            id: String::new(),
            account_id: String::new(),
            email: String::new(),
            display_name: None,
            active: true,
        }
    }
}

/// Atlassian user resource.
#[derive(Clone)]
pub struct UserResource {
    client: JiraClient,
    admin: Option<AdminClient>,
}

impl UserResource {
    /// Create the resource. Without an admin client `active` cannot change.
    #[must_use]
    pub fn new(client: JiraClient, admin: Option<AdminClient>) -> Self {
        Self { client, admin }
    }

    async fn find_by_email(&self, mut state: UserState) -> Result<UserState, ProviderError> {
        let email = state.id.clone();
        let search: UserPickerResponse = self
            .client
            .get_query(
                USER_PICKER_API_ENDPOINT,
                &[
                    ("query", email.as_str()),
                    ("showAvatar", "false"),
                    ("excludedConnectAddons", "true"),
                ],
            )
            .await?;

        let total = search.users.total;
        let user = match search.users.users.into_iter().next() {
            Some(user) if total == 1 => user,
            _ => {
                return Err(ProviderError::AmbiguousUser {
                    query: email,
                    total,
                })
            }
        };

        state.id.clone_from(&user.account_id);
        state.account_id = user.account_id;
        state.display_name = Some(user.display_name);
        state.email = email;
        Ok(state)
    }

    async fn find_by_account(
        &self,
        mut state: UserState,
    ) -> Result<Option<UserState>, ProviderError> {
        let user: User = match self
            .client
            .get_query(USER_API_ENDPOINT, &[("accountId", state.id.as_str())])
            .await
        {
            Ok(user) => user,
            Err(ProviderError::NotFound(_)) => {
                info!(account_id = %state.id, "User no longer exists");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        state.account_id = user.account_id;
        state.display_name = Some(user.display_name);
        state.active = user.active;
        if state.email.is_empty() {
            if let Some(email) = user.email_address {
                state.email = email;
            }
        }
        Ok(Some(state))
    }

    fn account_id(state: &UserState) -> &str {
        if state.account_id.is_empty() {
            &state.id
        } else {
            &state.account_id
        }
    }
}

#[async_trait]
impl Resource for UserResource {
    type State = UserState;

    const TYPE_NAME: &'static str = "jira_user";

    #[instrument(skip_all, fields(email = %desired.email))]
    async fn create(&self, desired: UserState) -> Result<UserState, ProviderError> {
        let request = UserCreateRequest {
            email_address: desired.email.clone(),
            display_name: desired.display_name.clone().filter(|n| !n.is_empty()),
        };
        let created: User = self.client.post(USER_API_ENDPOINT, &[], &request).await?;
        info!(account_id = %created.account_id, "Created user");

        let email = desired.email.clone();
        let mut state = Resource::read(
            self,
            UserState {
                id: created.account_id,
                ..desired
            },
        )
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("user {email}")))?;
        state.email = email;
        Ok(state)
    }

    #[instrument(skip_all, fields(user_id = %prior.id))]
    async fn read(&self, prior: UserState) -> Result<Option<UserState>, ProviderError> {
        if prior.id.contains('@') {
            self.find_by_email(prior).await.map(Some)
        } else {
            self.find_by_account(prior).await
        }
    }

    #[instrument(skip_all, fields(user_id = %prior.id))]
    async fn update(
        &self,
        prior: UserState,
        desired: UserState,
    ) -> Result<UserState, ProviderError> {
        if prior.email != desired.email {
            return Err(ProviderError::RequiresReplacement {
                resource: Self::TYPE_NAME,
                attribute: "email",
            });
        }
        if desired.display_name.is_some() && prior.display_name != desired.display_name {
            return Err(ProviderError::RequiresReplacement {
                resource: Self::TYPE_NAME,
                attribute: "display_name",
            });
        }

        let mut state = prior;
        if state.active != desired.active {
            let admin = self.admin.as_ref().ok_or_else(|| {
                ProviderError::Config(
                    "an admin API token is required to change 'active'".to_string(),
                )
            })?;
            admin
                .set_user_lifecycle(Self::account_id(&state), desired.active)
                .await?;
            state.active = desired.active;
        }
        Ok(state)
    }

    #[instrument(skip_all, fields(user_id = %state.id))]
    async fn delete(&self, state: UserState) -> Result<(), ProviderError> {
        let account_id = Self::account_id(&state);
        self.client
            .delete(USER_API_ENDPOINT, &[("accountId", account_id)])
            .await?;
        info!(account_id = %account_id, "Deleted user");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<UserState, ProviderError> {
        Resource::read(
            self,
            UserState {
                id: id.to_string(),
                ..UserState::default()
            },
        )
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("user {id}")))
    }
}
