//! Atlassian Admin API client.
//!
//! API Documentation: <https://developer.atlassian.com/cloud/admin/user-management/rest/>

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::ProviderError;

/// Base URL for the Atlassian Admin API.
pub const ADMIN_API_BASE_URL: &str = "https://api.atlassian.com/";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bearer-token client for the organization admin API.
#[derive(Clone)]
pub struct AdminClient {
    /// HTTP client.
    client: Client,
    /// API root, always ending in `/`.
    base_url: Url,
    /// Admin API key.
    token: String,
}

impl AdminClient {
    /// Create a client against the public Admin API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(ADMIN_API_BASE_URL, token)
    }

    /// Create a client with a custom API root.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the HTTP client cannot be created.
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: super::base_url(base_url)?,
            token: token.into(),
        })
    }

    /// Enable or disable an Atlassian account.
    ///
    /// # Errors
    /// Returns [`ProviderError::Api`] when the API rejects the request.
    pub async fn set_user_lifecycle(
        &self,
        account_id: &str,
        active: bool,
    ) -> Result<(), ProviderError> {
        let action = if active { "enable" } else { "disable" };
        let url = super::join(
            &self.base_url,
            &format!("users/{account_id}/manage/lifecycle/{action}"),
        )?;
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(account_id = %account_id, action, "Updated account lifecycle");
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(ProviderError::Api {
                status: status.as_u16(),
                message: format!("request failed: {text}"),
            })
        }
    }
}
