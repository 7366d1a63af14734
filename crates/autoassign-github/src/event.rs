use std::path::Path;

use autoassign_core::{AssignError, PullRequestContext};
use serde::Deserialize;

use crate::client::PullRequestRef;

/// Actions that trigger reviewer and assignee selection.
pub const HANDLED_ACTIONS: &[&str] = &["opened", "ready_for_review"];

/// The parts of a `pull_request` webhook payload autoassign reads.
///
/// # Examples
///
/// ```
/// use autoassign_github::PullRequestEvent;
///
/// let event = PullRequestEvent::from_json(r#"{
///     "action": "opened",
///     "pull_request": {"number": 1, "title": "test", "user": {"login": "pr-creator"}},
///     "repository": {"name": "auto-assign", "owner": {"login": "kentaro-m"}}
/// }"#).unwrap();
/// assert!(event.is_handled());
/// assert_eq!(event.context().actor, "pr-creator");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub pull_request: PullRequestPayload,
    pub repository: RepositoryPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub draft: bool,
    pub user: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub name: String,
    pub owner: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

impl PullRequestEvent {
    /// Parse an event payload from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::Event`] if the payload lacks a pull request,
    /// repository, or author.
    pub fn from_json(payload: &str) -> Result<Self, AssignError> {
        serde_json::from_str(payload).map_err(|e| AssignError::Event(e.to_string()))
    }

    /// Read and parse an event payload file, such as `$GITHUB_EVENT_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::FileNotFound`] if `path` does not exist, and the
    /// errors of [`PullRequestEvent::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, AssignError> {
        if !path.exists() {
            return Err(AssignError::FileNotFound(path.to_path_buf()));
        }
        let payload = std::fs::read_to_string(path)?;
        Self::from_json(&payload)
    }

    /// `true` for actions that should trigger selection.
    pub fn is_handled(&self) -> bool {
        HANDLED_ACTIONS.contains(&self.action.as_str())
    }

    /// Author, title, and draft state for the selection engine.
    pub fn context(&self) -> PullRequestContext {
        PullRequestContext {
            actor: self.pull_request.user.login.clone(),
            title: self.pull_request.title.clone(),
            draft: self.pull_request.draft,
        }
    }

    /// The pull request this event refers to.
    pub fn target(&self) -> PullRequestRef {
        PullRequestRef {
            owner: self.repository.owner.login.clone(),
            repo: self.repository.name.clone(),
            number: self.pull_request.number,
        }
    }
}
