//! Error types for the Jira provider.

use thiserror::Error;

/// Errors raised while reconciling custom field values.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A declared JSON value could not be serialized back after projection.
    #[error("Malformed declared value for field '{field}': {source}")]
    MalformedDeclaredValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// The observed value has no scalar rendering (object, array or null).
    #[error("Field '{field}' is declared as a literal but Jira reports a {kind}")]
    UnsupportedScalarType { field: String, kind: &'static str },
}

/// Errors that can occur during provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Remote object not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom field reconciliation failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Resource id has the wrong format.
    #[error("Invalid resource id: {0}")]
    InvalidId(String),

    /// The attribute cannot be changed in place.
    #[error("Changing '{attribute}' on {resource} requires replacing the resource")]
    RequiresReplacement {
        resource: &'static str,
        attribute: &'static str,
    },

    /// A user lookup by email did not match exactly one account.
    #[error("No exact match for '{query}', found {total} users")]
    AmbiguousUser { query: String, total: u64 },

    /// The account is not a member of the group.
    #[error("Cannot find group '{group}' for account {account_id}")]
    MembershipNotFound { account_id: String, group: String },

    /// No resource type registered under this name.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),
}
