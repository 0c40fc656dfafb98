//! Resource abstractions for Jira objects.

pub mod group;
pub mod group_membership;
pub mod issue;
pub mod user;
mod traits;

pub use group::{GroupResource, GroupState};
pub use group_membership::{GroupMembershipResource, GroupMembershipState};
pub use issue::{IssueResource, IssueState};
pub use traits::{DynResource, Resource};
pub use user::{UserResource, UserState};
