//! HTTP clients for the Jira REST API and the Atlassian Admin API.

mod admin;
mod jira;

pub use admin::{AdminClient, ADMIN_API_BASE_URL};
pub use jira::JiraClient;

use url::Url;

use crate::error::ProviderError;

/// Parse a base URL so that relative paths resolve beneath it.
fn base_url(raw: &str) -> Result<Url, ProviderError> {
    let mut url =
        Url::parse(raw).map_err(|e| ProviderError::Config(format!("invalid url '{raw}': {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve `path` against the base. Leading slashes are dropped so the
/// base path is kept.
fn join(base: &Url, path: &str) -> Result<Url, ProviderError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ProviderError::Config(format!("invalid path '{path}': {e}")))
}
