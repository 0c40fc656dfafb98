//! Jira Cloud REST API client.
//!
//! API Documentation: <https://developer.atlassian.com/cloud/jira/platform/rest/v2/>

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Basic-auth client for a single Jira site.
#[derive(Clone)]
pub struct JiraClient {
    /// HTTP client.
    client: Client,
    /// Site root, always ending in `/`.
    base_url: Url,
    /// Account email.
    user: String,
    /// API token.
    password: String,
}

impl JiraClient {
    /// Create a new Jira client.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(
        base_url: &str,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: super::base_url(base_url)?,
            user: user.into(),
            password: password.into(),
        })
    }

    /// Create a client from provider configuration.
    ///
    /// # Errors
    /// See [`JiraClient::new`].
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::new(&config.url, &config.user, &config.password)
    }

    /// Site root the client sends requests to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ProviderError> {
        let url = super::join(&self.base_url, path)?;
        debug!(method = %method, url = %url, "Jira request");

        Ok(self
            .client
            .request(method, url)
            .basic_auth(&self.user, Some(&self.password)))
    }

    /// Make an authenticated GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        self.get_query(path, &[]).await
    }

    /// Make an authenticated GET request with query parameters.
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self.request(Method::GET, path)?.query(query).send().await?;
        Self::handle_response(response).await
    }

    /// Make an authenticated POST request with a JSON body.
    pub async fn post<T, B>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .request(Method::POST, path)?
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Make an authenticated POST request whose response body is ignored.
    pub async fn post_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<(), ProviderError> {
        let response = self
            .request(Method::POST, path)?
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    /// Make an authenticated PUT request whose response body is ignored.
    pub async fn put_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ProviderError> {
        let response = self.request(Method::PUT, path)?.json(body).send().await?;
        Self::handle_empty(response).await
    }

    /// Make an authenticated DELETE request.
    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<(), ProviderError> {
        let response = self
            .request(Method::DELETE, path)?
            .query(query)
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    /// Handle API response, parsing JSON or error.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                ProviderError::Serialization(e)
            })
        } else {
            Err(Self::error_for(status, text))
        }
    }

    async fn handle_empty(response: reqwest::Response) -> Result<(), ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(Self::error_for(status, text))
        }
    }

    fn error_for(status: StatusCode, message: String) -> ProviderError {
        if status == StatusCode::NOT_FOUND {
            ProviderError::NotFound(message)
        } else {
            ProviderError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = JiraClient::new("https://example.atlassian.net/jira", "u", "p").unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.atlassian.net/jira/");
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            JiraClient::error_for(StatusCode::NOT_FOUND, "gone".into()),
            ProviderError::NotFound(m) if m == "gone"
        ));
        assert!(matches!(
            JiraClient::error_for(StatusCode::BAD_REQUEST, "bad".into()),
            ProviderError::Api { status: 400, .. }
        ));
    }
}
