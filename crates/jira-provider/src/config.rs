//! Provider configuration.

use std::env;

use url::Url;

use crate::error::ProviderError;

/// Jira Cloud site URL (e.g. `https://your-domain.atlassian.net`).
pub const ENV_URL: &str = "JIRA_URL";
/// Account email used for basic auth against the Jira REST API.
pub const ENV_USER: &str = "JIRA_USER";
/// API token (or password) used for basic auth against the Jira REST API.
pub const ENV_PASSWORD: &str = "JIRA_PASSWORD";
/// Atlassian Admin API bearer token (optional).
pub const ENV_TOKEN: &str = "JIRA_TOKEN";

/// Settings needed to talk to Jira and the Atlassian Admin API.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Jira site URL.
    pub url: String,
    /// Basic auth user.
    pub user: String,
    /// Basic auth password or API token.
    pub password: String,
    /// Admin API token; user lifecycle changes are unavailable without it.
    pub token: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    /// Build a configuration from explicit values.
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Read the configuration from `JIRA_URL`, `JIRA_USER`, `JIRA_PASSWORD`
    /// and `JIRA_TOKEN`.
    ///
    /// # Errors
    /// Returns [`ProviderError::Config`] naming the first missing variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let config = Self {
            url: required(ENV_URL)?,
            user: required(ENV_USER)?,
            password: required(ENV_PASSWORD)?,
            token: optional(ENV_TOKEN),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the site URL is an absolute http(s) URL and credentials are set.
    ///
    /// # Errors
    /// Returns [`ProviderError::Config`] describing the problem.
    pub fn validate(&self) -> Result<(), ProviderError> {
        let url = Url::parse(&self.url)
            .map_err(|e| ProviderError::Config(format!("invalid url '{}': {e}", self.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::Config(format!(
                "url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.user.is_empty() {
            return Err(ProviderError::Config("user must not be empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(ProviderError::Config("password must not be empty".to_string()));
        }
        Ok(())
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

fn required(name: &str) -> Result<String, ProviderError> {
    optional(name).ok_or_else(|| ProviderError::Config(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [ENV_URL, ENV_USER, ENV_PASSWORD, ENV_TOKEN] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_reads_all_values() {
        clear_env();
        env::set_var(ENV_URL, "https://example.atlassian.net");
        env::set_var(ENV_USER, "bot@example.com");
        env::set_var(ENV_PASSWORD, "secret");
        env::set_var(ENV_TOKEN, "admin-token");

        let config = ProviderConfig::from_env().unwrap();
        assert_eq!(config.url, "https://example.atlassian.net");
        assert_eq!(config.user, "bot@example.com");
        assert_eq!(config.password, "secret");
        assert_eq!(config.token.as_deref(), Some("admin-token"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_user() {
        clear_env();
        env::set_var(ENV_URL, "https://example.atlassian.net");
        env::set_var(ENV_PASSWORD, "secret");

        let err = ProviderConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_USER));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_token_is_unset() {
        clear_env();
        env::set_var(ENV_URL, "https://example.atlassian.net");
        env::set_var(ENV_USER, "bot");
        env::set_var(ENV_PASSWORD, "secret");
        env::set_var(ENV_TOKEN, "");

        let config = ProviderConfig::from_env().unwrap();
        assert!(config.token.is_none());
        clear_env();
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let config = ProviderConfig::new("not a url", "u", "p", None);
        assert!(matches!(config.validate(), Err(ProviderError::Config(_))));

        let config = ProviderConfig::new("ftp://example.com", "u", "p", None);
        assert!(matches!(config.validate(), Err(ProviderError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ProviderConfig::new(
            "https://example.atlassian.net",
            "u",
            "hunter2",
            Some("tok".to_string()),
        );
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok\""));
    }
}
