//! Core types, configuration, and error handling for autoassign.
//!
//! This crate provides the shared foundation used by the other autoassign crates:
//! - [`AssignError`] — unified error type using `thiserror` and `miette`
//! - [`Configuration`] — repository configuration loaded from `.github/auto_assign.toml`
//! - Shared types: [`PullRequestContext`], [`SelectionResult`],
//!   [`ReviewerSelection`], [`TeamRef`]
//! - Collaborator traits the selection engine is driven through:
//!   [`ConfigLoader`], [`TeamMembershipLookup`], [`ReviewSubmitter`],
//!   [`AssigneeSubmitter`]

mod collaborators;
mod config;
mod error;
mod types;

pub use collaborators::{AssigneeSubmitter, ConfigLoader, ReviewSubmitter, TeamMembershipLookup};
pub use config::{
    AddAssignees, AssigneeMode, Configuration, FileConfigLoader, Groups, DEFAULT_CONFIG_PATH,
};
pub use error::AssignError;
pub use types::{PullRequestContext, ReviewerSelection, SelectionResult, TeamRef};

/// A convenience `Result` type for autoassign operations.
pub type Result<T> = std::result::Result<T, AssignError>;
