//! Reviewer and assignee selection for newly opened pull requests.
//!
//! The engine turns a [`Configuration`](autoassign_core::Configuration) plus
//! the triggering pull request into concrete reviewer and assignee lists:
//! - [`keywords`] — title-based skip filter
//! - [`resolve`] — user/team partitioning, author exclusion, per-group selection
//! - [`sample`] — random subset with the "0 means everyone" rule
//! - [`reviewers`] / [`assignees`] — branch selection from configuration flags
//! - [`handler`] — the per-event orchestrator driving external collaborators

pub mod assignees;
pub mod handler;
pub mod keywords;
pub mod resolve;
pub mod reviewers;
pub mod sample;

pub use handler::{AutoAssign, PhaseOutcome, RunReport};
