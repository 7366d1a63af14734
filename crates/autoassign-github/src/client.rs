use std::fmt;

use async_trait::async_trait;
use autoassign_core::{
    AssignError, AssigneeSubmitter, ConfigLoader, Configuration, ReviewSubmitter,
    TeamMembershipLookup,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://api.github.com";
const PAGE_SIZE: usize = 100;

/// GitHub REST client for team lookups, review requests, and assignees.
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
}

impl GitHubClient {
    /// Create a client from an explicit token, or `GITHUB_TOKEN` / `GH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::InvalidConfig`] if no token is available, or
    /// [`AssignError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use autoassign_github::GitHubClient;
    ///
    /// let client = GitHubClient::new(Some("ghp_xxxx")).unwrap();
    /// ```
    pub fn new(token: Option<&str>) -> Result<Self, AssignError> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN")
                .or_else(|_| std::env::var("GH_TOKEN"))
                .map_err(|_| {
                    AssignError::InvalidConfig(
                        "GITHUB_TOKEN not set. Pass --github-token or set GITHUB_TOKEN env var"
                            .into(),
                    )
                })?,
        };

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| AssignError::GitHub(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::new();

        Ok(Self {
            octocrab,
            http,
            token,
        })
    }

    /// Fetch a file from the default branch of a repository.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::GitHub`] on network or API errors.
    pub async fn fetch_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, AssignError> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}/contents/{path}");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.raw+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "autoassign")
            .send()
            .await
            .map_err(|e| AssignError::GitHub(format!("failed to fetch {path}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssignError::GitHub(format!(
                "fetching {path} returned {status}: {body}"
            )));
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| AssignError::GitHub(format!("failed to read {path}: {e}")))
    }

    /// Resolve `org/team_slug` to the numeric team id.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::TeamNotFound`] when the lookup fails.
    pub async fn team_id(&self, org: &str, team_slug: &str) -> Result<u64, AssignError> {
        let route = format!("/orgs/{org}/teams/{team_slug}");
        let team: Team = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| AssignError::TeamNotFound {
                org: org.to_string(),
                team: team_slug.to_string(),
                reason: e.to_string(),
            })?;
        Ok(team.id)
    }

    /// List member logins of a team by id, following pagination.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::GitHub`] when a page cannot be fetched.
    pub async fn team_members(&self, team_id: u64) -> Result<Vec<String>, AssignError> {
        let route = format!("/teams/{team_id}/members");
        let mut logins = Vec::new();
        for page in 1.. {
            let params = PageParams {
                per_page: PAGE_SIZE,
                page,
            };
            let members: Vec<Member> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| AssignError::GitHub(e.to_string()))?;
            let last = members.len() < PAGE_SIZE;
            logins.extend(members.into_iter().map(|m| m.login));
            if last {
                break;
            }
        }
        Ok(logins)
    }

    /// Request reviews from users and teams on a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::GitHub`] on API errors.
    pub async fn request_reviewers(
        &self,
        pr: &PullRequestRef,
        reviewers: &[String],
        team_reviewers: &[String],
    ) -> Result<(), AssignError> {
        let route = format!(
            "/repos/{}/{}/pulls/{}/requested_reviewers",
            pr.owner, pr.repo, pr.number
        );
        let body = serde_json::json!({
            "reviewers": reviewers,
            "team_reviewers": team_reviewers,
        });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&body))
            .await
            .map_err(|e| AssignError::GitHub(format!("failed to request reviewers: {e}")))?;

        Ok(())
    }

    /// Add assignees to a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::GitHub`] on API errors.
    pub async fn add_assignees(
        &self,
        pr: &PullRequestRef,
        assignees: &[String],
    ) -> Result<(), AssignError> {
        let route = format!(
            "/repos/{}/{}/issues/{}/assignees",
            pr.owner, pr.repo, pr.number
        );
        let body = serde_json::json!({ "assignees": assignees });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&body))
            .await
            .map_err(|e| AssignError::GitHub(format!("failed to add assignees: {e}")))?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Team {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct Member {
    login: String,
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

#[async_trait]
impl TeamMembershipLookup for GitHubClient {
    async fn list_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>, AssignError> {
        let id = self.team_id(org, team_slug).await?;
        self.team_members(id)
            .await
            .map_err(|e| AssignError::TeamMembers {
                org: org.to_string(),
                team: team_slug.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Identifies a pull request: `owner/repo#number`.
///
/// # Examples
///
/// ```
/// use autoassign_github::PullRequestRef;
///
/// let pr: PullRequestRef = "octocat/hello-world#42".parse().unwrap();
/// assert_eq!(pr.number, 42);
/// assert_eq!(pr.to_string(), "octocat/hello-world#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl std::str::FromStr for PullRequestRef {
    type Err = AssignError;

    fn from_str(pr_ref: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AssignError::InvalidConfig(format!(
                "invalid PR reference '{pr_ref}', expected owner/repo#number"
            ))
        };
        let (owner_repo, number_str) = pr_ref.split_once('#').ok_or_else(invalid)?;
        let (owner, repo) = owner_repo.split_once('/').ok_or_else(invalid)?;
        let number = number_str
            .parse()
            .map_err(|_| AssignError::InvalidConfig(format!("invalid PR number: {number_str}")))?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Submits reviewers and assignees to one pull request.
pub struct PullRequestApi<'a> {
    client: &'a GitHubClient,
    pr: PullRequestRef,
}

impl<'a> PullRequestApi<'a> {
    pub fn new(client: &'a GitHubClient, pr: PullRequestRef) -> Self {
        Self { client, pr }
    }
}

#[async_trait]
impl<'a> ReviewSubmitter for PullRequestApi<'a> {
    async fn request_reviewers(
        &self,
        reviewers: &[String],
        team_reviewers: &[String],
    ) -> Result<(), AssignError> {
        self.client
            .request_reviewers(&self.pr, reviewers, team_reviewers)
            .await
    }
}

#[async_trait]
impl<'a> AssigneeSubmitter for PullRequestApi<'a> {
    async fn add_assignees(&self, assignees: &[String]) -> Result<(), AssignError> {
        self.client.add_assignees(&self.pr, assignees).await
    }
}

/// Loads the configuration file from the repository itself.
pub struct RepoConfigLoader<'a> {
    client: &'a GitHubClient,
    owner: String,
    repo: String,
    path: String,
}

impl<'a> RepoConfigLoader<'a> {
    pub fn new(
        client: &'a GitHubClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl<'a> ConfigLoader for RepoConfigLoader<'a> {
    async fn load(&self) -> Result<Option<Configuration>, AssignError> {
        let Some(content) = self
            .client
            .fetch_file(&self.owner, &self.repo, &self.path)
            .await?
        else {
            tracing::debug!(
                repo = %format!("{}/{}", self.owner, self.repo),
                path = %self.path,
                "no configuration in repository"
            );
            return Ok(None);
        };
        Configuration::from_toml(&content).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_pr_reference() {
        let pr: PullRequestRef = "rust-lang/rust#12345".parse().unwrap();
        assert_eq!(pr.owner, "rust-lang");
        assert_eq!(pr.repo, "rust");
        assert_eq!(pr.number, 12345);
    }

    #[test]
    fn parse_pr_reference_missing_hash() {
        assert!("owner/repo".parse::<PullRequestRef>().is_err());
    }

    #[test]
    fn parse_pr_reference_missing_slash() {
        assert!("repo#123".parse::<PullRequestRef>().is_err());
    }

    #[test]
    fn parse_pr_reference_invalid_number() {
        let err = "owner/repo#abc".parse::<PullRequestRef>().unwrap_err();
        assert!(err.to_string().contains("invalid PR number"));
    }
}
