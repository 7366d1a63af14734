use std::fmt;

use autoassign_core::{
    AssignError, AssigneeMode, AssigneeSubmitter, ConfigLoader, Configuration, PullRequestContext,
    ReviewSubmitter, ReviewerSelection, TeamMembershipLookup,
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::assignees::choose_assignees;
use crate::keywords::should_skip;
use crate::reviewers::choose_reviewers;

/// Outcome of one handler run.
///
/// # Examples
///
/// ```
/// use autoassign_engine::{PhaseOutcome, RunReport};
///
/// let report = RunReport::Completed {
///     reviewers: PhaseOutcome::Empty,
///     assignees: PhaseOutcome::Disabled,
/// };
/// assert!(!report.is_skipped());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum RunReport {
    /// The pull request was ignored before any selection happened.
    Skipped { reason: String },
    /// Both phases ran; each carries its own outcome.
    Completed {
        reviewers: PhaseOutcome,
        assignees: PhaseOutcome,
    },
}

impl RunReport {
    fn skipped(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        info!("{reason}");
        Self::Skipped { reason }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Result of the reviewer or assignee phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum PhaseOutcome {
    /// Turned off in the configuration.
    Disabled,
    /// Enabled, but nobody was selected, so nothing was submitted.
    Empty,
    /// Submitted successfully.
    Submitted {
        users: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        teams: Vec<String>,
    },
    /// The submission call failed; the other phase is unaffected.
    Failed {
        users: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        teams: Vec<String>,
        error: String,
    },
}

impl fmt::Display for PhaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Empty => write!(f, "nobody selected"),
            Self::Submitted { users, teams } => {
                write!(f, "{}", describe(users, teams))
            }
            Self::Failed {
                users,
                teams,
                error,
            } => write!(f, "failed for {} ({error})", describe(users, teams)),
        }
    }
}

fn describe(users: &[String], teams: &[String]) -> String {
    let mut names: Vec<String> = users.iter().map(|u| format!("@{u}")).collect();
    names.extend(teams.iter().map(|t| format!("team:{t}")));
    names.join(", ")
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { reason } => writeln!(f, "Skipped: {reason}"),
            Self::Completed {
                reviewers,
                assignees,
            } => {
                writeln!(f, "Reviewers: {reviewers}")?;
                writeln!(f, "Assignees: {assignees}")
            }
        }
    }
}

/// Per-event orchestrator: gate the pull request, select, then submit.
///
/// Runs `load config → keyword check → draft check → skip users → validate →
/// team expansion → reviewer phase → assignee phase`. Anything up to and
/// including team expansion may end the run early or fail it; the two
/// submission phases catch and log their own errors.
pub struct AutoAssign<'a> {
    config: &'a dyn ConfigLoader,
    teams: &'a dyn TeamMembershipLookup,
    reviews: &'a dyn ReviewSubmitter,
    assignees: &'a dyn AssigneeSubmitter,
}

impl<'a> AutoAssign<'a> {
    pub fn new(
        config: &'a dyn ConfigLoader,
        teams: &'a dyn TeamMembershipLookup,
        reviews: &'a dyn ReviewSubmitter,
        assignees: &'a dyn AssigneeSubmitter,
    ) -> Self {
        Self {
            config,
            teams,
            reviews,
            assignees,
        }
    }

    /// Handle one pull request event.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::ConfigMissing`] when no configuration loads,
    /// [`AssignError::InvalidConfig`] when validation fails, and the team
    /// lookup error when a `reviewersInTeams` entry cannot be expanded.
    /// Submission failures are not errors; they appear as
    /// [`PhaseOutcome::Failed`] in the report.
    pub async fn handle<R: Rng + ?Sized>(
        &self,
        pr: &PullRequestContext,
        rng: &mut R,
    ) -> Result<RunReport, AssignError> {
        let config = self.config.load().await?.ok_or(AssignError::ConfigMissing)?;

        if let Some(keywords) = &config.skip_keywords {
            if should_skip(&pr.title, keywords) {
                return Ok(RunReport::skipped("skips adding reviewers"));
            }
        }
        if pr.draft {
            return Ok(RunReport::skipped("ignore draft PR"));
        }
        if let Some(users) = &config.skip_users {
            if users.iter().any(|user| *user == pr.actor) {
                return Ok(RunReport::skipped(format!("ignore for user {}", pr.actor)));
            }
        }

        config.validate()?;
        let assignee_mode = config.add_assignees.mode()?;

        let team_members = if config.add_reviewers || assignee_mode == AssigneeMode::Pick {
            self.expand_teams(&config).await?
        } else {
            Vec::new()
        };

        let selection = choose_reviewers(&pr.actor, &config, &team_members, rng);
        debug!(
            reviewers = ?selection.reviewers,
            teams = ?selection.team_reviewers,
            "reviewer selection"
        );
        let reviewers = if config.add_reviewers {
            self.submit_reviewers(&selection).await
        } else {
            PhaseOutcome::Disabled
        };

        let assignees = match assignee_mode {
            AssigneeMode::Off => PhaseOutcome::Disabled,
            AssigneeMode::Pick | AssigneeMode::Author => {
                let chosen = choose_assignees(&pr.actor, &config, &selection.reviewers, rng)?;
                debug!(assignees = ?chosen, "assignee selection");
                self.submit_assignees(chosen).await
            }
        };

        Ok(RunReport::Completed {
            reviewers,
            assignees,
        })
    }

    async fn expand_teams(&self, config: &Configuration) -> Result<Vec<String>, AssignError> {
        let mut members: Vec<String> = Vec::new();
        for team in config.team_refs()? {
            let logins = self.teams.list_members(&team.org, &team.slug).await?;
            debug!(team = %team, count = logins.len(), "expanded team");
            for login in logins {
                if !members.contains(&login) {
                    members.push(login);
                }
            }
        }
        Ok(members)
    }

    async fn submit_reviewers(&self, selection: &ReviewerSelection) -> PhaseOutcome {
        if selection.is_empty() {
            info!("no reviewers to request");
            return PhaseOutcome::Empty;
        }
        match self
            .reviews
            .request_reviewers(&selection.reviewers, &selection.team_reviewers)
            .await
        {
            Ok(()) => {
                info!(
                    reviewers = ?selection.reviewers,
                    teams = ?selection.team_reviewers,
                    "requested reviews"
                );
                PhaseOutcome::Submitted {
                    users: selection.reviewers.clone(),
                    teams: selection.team_reviewers.clone(),
                }
            }
            Err(e) => {
                error!(error = %e, "failed to request reviewers");
                PhaseOutcome::Failed {
                    users: selection.reviewers.clone(),
                    teams: selection.team_reviewers.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn submit_assignees(&self, assignees: Vec<String>) -> PhaseOutcome {
        if assignees.is_empty() {
            info!("no assignees to add");
            return PhaseOutcome::Empty;
        }
        match self.assignees.add_assignees(&assignees).await {
            Ok(()) => {
                info!(assignees = ?assignees, "added assignees");
                PhaseOutcome::Submitted {
                    users: assignees,
                    teams: Vec::new(),
                }
            }
            Err(e) => {
                error!(error = %e, "failed to add assignees");
                PhaseOutcome::Failed {
                    users: assignees,
                    teams: Vec::new(),
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_text_lists_reviewers_and_teams() {
        let report = RunReport::Completed {
            reviewers: PhaseOutcome::Submitted {
                users: vec!["alice".into()],
                teams: vec!["core".into()],
            },
            assignees: PhaseOutcome::Failed {
                users: vec!["bob".into()],
                teams: vec![],
                error: "boom".into(),
            },
        };
        let text = report.to_string();
        assert!(text.contains("Reviewers: @alice, team:core"));
        assert!(text.contains("Assignees: failed for @bob (boom)"));
    }

    #[test]
    fn report_json_is_tagged() {
        let report = RunReport::Completed {
            reviewers: PhaseOutcome::Empty,
            assignees: PhaseOutcome::Disabled,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["reviewers"]["outcome"], "empty");
        assert_eq!(json["assignees"]["outcome"], "disabled");
    }

    #[test]
    fn skipped_report_keeps_reason() {
        let report = RunReport::Skipped {
            reason: "ignore draft PR".into(),
        };
        assert!(report.is_skipped());
        assert_eq!(report.to_string(), "Skipped: ignore draft PR\n");
    }
}
