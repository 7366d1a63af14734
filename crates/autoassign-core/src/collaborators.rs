use async_trait::async_trait;

use crate::config::Configuration;
use crate::error::AssignError;

/// Source of the repository configuration.
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// Load the configuration, or `Ok(None)` when the repository has none.
    async fn load(&self) -> Result<Option<Configuration>, AssignError>;
}

/// Resolves an organization team into member logins.
#[async_trait]
pub trait TeamMembershipLookup: Send + Sync {
    /// List the logins of every member of `org/team_slug`.
    ///
    /// An empty list is a valid answer. Failures must say whether the team id
    /// could not be resolved ([`AssignError::TeamNotFound`]) or the member
    /// listing failed ([`AssignError::TeamMembers`]).
    async fn list_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>, AssignError>;
}

/// Requests reviews on the triggering pull request.
#[async_trait]
pub trait ReviewSubmitter: Send + Sync {
    async fn request_reviewers(
        &self,
        reviewers: &[String],
        team_reviewers: &[String],
    ) -> Result<(), AssignError>;
}

/// Adds assignees to the triggering pull request.
#[async_trait]
pub trait AssigneeSubmitter: Send + Sync {
    async fn add_assignees(&self, assignees: &[String]) -> Result<(), AssignError>;
}
