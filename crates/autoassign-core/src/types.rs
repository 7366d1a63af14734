use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssignError;

/// Read-only view of the pull request that triggered a run.
///
/// # Examples
///
/// ```
/// use autoassign_core::PullRequestContext;
///
/// let pr = PullRequestContext::new("octocat", "Add login page");
/// assert!(!pr.draft);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestContext {
    /// Login of the pull request author.
    pub actor: String,
    /// Pull request title.
    pub title: String,
    /// Whether the pull request is still a draft.
    #[serde(default)]
    pub draft: bool,
}

impl PullRequestContext {
    /// Create a context for a non-draft pull request.
    pub fn new(actor: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            title: title.into(),
            draft: false,
        }
    }
}

/// Candidates split into individual users and team slugs.
///
/// # Examples
///
/// ```
/// use autoassign_core::SelectionResult;
///
/// let result = SelectionResult::default();
/// assert!(result.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    /// Unique user logins, in configuration order.
    pub users: Vec<String>,
    /// Team slugs, in configuration order.
    pub teams: Vec<String>,
}

impl SelectionResult {
    /// `true` when neither users nor teams were selected.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.teams.is_empty()
    }
}

/// Final reviewer choice for one pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerSelection {
    /// Individual reviewer logins.
    pub reviewers: Vec<String>,
    /// Team slugs to request review from.
    pub team_reviewers: Vec<String>,
}

impl ReviewerSelection {
    /// `true` when there is nobody to request a review from.
    pub fn is_empty(&self) -> bool {
        self.reviewers.is_empty() && self.team_reviewers.is_empty()
    }
}

/// An `org/team_slug` reference from `reviewersInTeams`.
///
/// # Examples
///
/// ```
/// use autoassign_core::TeamRef;
///
/// let team: TeamRef = "acme/backend-core".parse().unwrap();
/// assert_eq!(team.org, "acme");
/// assert_eq!(team.slug, "backend-core");
/// assert!("acme".parse::<TeamRef>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamRef {
    /// Organization login.
    pub org: String,
    /// Team slug within the organization.
    pub slug: String,
}

impl FromStr for TeamRef {
    type Err = AssignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AssignError::InvalidConfig(format!(
                "invalid reviewersInTeams entry '{s}', expected org/team_slug"
            ))
        };
        let (org, slug) = s.split_once('/').ok_or_else(invalid)?;
        if !is_slug(org) || !is_slug(slug) {
            return Err(invalid());
        }
        Ok(Self {
            org: org.to_string(),
            slug: slug.to_string(),
        })
    }
}

fn is_slug(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for TeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_ref_parses_org_and_slug() {
        let team: TeamRef = "my-org/my_team.v2".parse().unwrap();
        assert_eq!(team.org, "my-org");
        assert_eq!(team.slug, "my_team.v2");
        assert_eq!(team.to_string(), "my-org/my_team.v2");
    }

    #[test]
    fn team_ref_rejects_malformed_entries() {
        for bad in ["", "org", "/team", "org/", "org/team/extra", "org/te am"] {
            let err = bad.parse::<TeamRef>().unwrap_err();
            assert!(
                err.to_string().contains("expected org/team_slug"),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_selections() {
        assert!(ReviewerSelection::default().is_empty());
        let selection = ReviewerSelection {
            reviewers: vec![],
            team_reviewers: vec!["core".into()],
        };
        assert!(!selection.is_empty());
    }

    #[test]
    fn context_serializes_camel_case() {
        let pr = PullRequestContext::new("octocat", "Fix");
        let json = serde_json::to_value(&pr).unwrap();
        assert_eq!(json["actor"], "octocat");
        assert_eq!(json["draft"], false);
    }
}
