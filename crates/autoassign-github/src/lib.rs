//! GitHub integration for autoassign.
//!
//! Parses `pull_request` event payloads, loads the repository configuration
//! through the contents API, expands organization teams, and submits review
//! requests and assignees through the REST API.

pub mod client;
pub mod event;

pub use client::{GitHubClient, PullRequestApi, PullRequestRef, RepoConfigLoader};
pub use event::PullRequestEvent;
