//! Declarative Jira and Atlassian Cloud resources.
//!
//! This crate manages issues, users, groups and group memberships against
//! the Jira Cloud REST API and the Atlassian Admin API. Each resource type
//! implements [`Resource`] and is registered on a [`Provider`].
//!
//! Custom issue fields are declared as strings and reconciled on read, see
//! [`mod@reconcile`].
//!
//! # Example
//!
//! ```rust,ignore
//! use jira_provider::{IssueResource, IssueState, JiraClient, Resource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client =
//!         JiraClient::new("https://your-domain.atlassian.net", "bot@example.com", "token")?;
//!     let issues = IssueResource::new(client);
//!
//!     let issue = issues.create(IssueState {
//!         summary: "Rotate credentials".into(),
//!         issue_type: "Task".into(),
//!         project_key: "OPS".into(),
//!         ..IssueState::default()
//!     }).await?;
//!
//!     println!("created {}", issue.issue_key);
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod reconcile;
pub mod resources;

pub use client::{AdminClient, JiraClient};
pub use config::ProviderConfig;
pub use error::{ProviderError, ReconcileError};
pub use provider::{Provider, ResourceRegistry};
pub use reconcile::reconcile;
pub use resources::{
    DynResource, GroupMembershipResource, GroupMembershipState, GroupResource, GroupState,
    IssueResource, IssueState, Resource, UserResource, UserState,
};
