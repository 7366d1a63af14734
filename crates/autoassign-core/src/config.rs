use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::collaborators::ConfigLoader;
use crate::error::AssignError;
use crate::types::TeamRef;

/// Where the repository configuration lives, relative to the repository root.
pub const DEFAULT_CONFIG_PATH: &str = ".github/auto_assign.toml";

/// Repository configuration loaded from `.github/auto_assign.toml`.
///
/// Keys are camelCase. Every field is optional in the file; omitted flags are
/// `false`, omitted counts are `0` (meaning "everyone").
///
/// # Examples
///
/// ```
/// use autoassign_core::Configuration;
///
/// let config = Configuration::from_toml(r#"
/// addReviewers = true
/// reviewers = ["alice", "bob"]
/// numberOfReviewers = 1
/// "#).unwrap();
/// assert!(config.add_reviewers);
/// assert_eq!(config.number_of_reviewers, 1);
/// assert!(config.assignees.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Request reviews when a pull request opens.
    #[serde(default)]
    pub add_reviewers: bool,
    /// `true`, `false`, or `"author"`.
    #[serde(default)]
    pub add_assignees: AddAssignees,
    /// Reviewer candidates; entries containing `/` are teams.
    #[serde(default)]
    pub reviewers: Vec<String>,
    /// Assignee candidates. When absent, the chosen reviewers are assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    /// Named reviewer groups, sampled independently.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_groups: Option<Groups>,
    /// Named assignee groups, sampled independently.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_groups: Option<Groups>,
    #[serde(default)]
    pub use_review_groups: bool,
    #[serde(default)]
    pub use_assignee_groups: bool,
    /// How many reviewers to pick (per group when grouped). `0` picks everyone.
    #[serde(default)]
    pub number_of_reviewers: usize,
    /// How many assignees to pick. Falls back to `numberOfReviewers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_assignees: Option<usize>,
    /// Title keywords that skip the pull request (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_keywords: Option<Vec<String>>,
    /// Authors whose pull requests are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_users: Option<Vec<String>>,
    /// `org/team_slug` entries whose members join the reviewer pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewers_in_teams: Option<Vec<String>>,
}

impl Configuration {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::Io`] if the file cannot be read, or
    /// [`AssignError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, AssignError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::Toml`] if parsing fails.
    pub fn from_toml(content: &str) -> Result<Self, AssignError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Check every rule that makes a configuration unusable.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::InvalidConfig`] when a group flag is set without
    /// its group map, when `addAssignees` is a string other than `"author"`,
    /// or when a `reviewersInTeams` entry is not `org/team_slug`.
    ///
    /// # Examples
    ///
    /// ```
    /// use autoassign_core::Configuration;
    ///
    /// let config = Configuration::from_toml("useReviewGroups = true").unwrap();
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), AssignError> {
        if self.use_review_groups && self.review_groups.is_none() {
            return Err(AssignError::InvalidConfig(
                "Error in configuration file to do with using review groups. Expected 'reviewGroups' variable to be set because the variable 'useReviewGroups' = true.".into(),
            ));
        }
        if self.use_assignee_groups && self.assignee_groups.is_none() {
            return Err(AssignError::InvalidConfig(
                "Error in configuration file to do with using assignee groups. Expected 'assigneeGroups' variable to be set because the variable 'useAssigneeGroups' = true.".into(),
            ));
        }
        self.add_assignees.mode()?;
        self.team_refs()?;
        Ok(())
    }

    /// Parsed `reviewersInTeams` entries, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::InvalidConfig`] on the first malformed entry.
    pub fn team_refs(&self) -> Result<Vec<TeamRef>, AssignError> {
        self.reviewers_in_teams
            .iter()
            .flatten()
            .map(|entry| entry.parse())
            .collect()
    }

    /// Assignee count, falling back to the reviewer count.
    pub fn assignee_count(&self) -> usize {
        self.number_of_assignees.unwrap_or(self.number_of_reviewers)
    }
}

/// Raw `addAssignees` value: a boolean or a string.
///
/// Any string deserializes so that an unsupported value can be reported with
/// a precise message by [`AddAssignees::mode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddAssignees {
    Flag(bool),
    Named(String),
}

impl Default for AddAssignees {
    fn default() -> Self {
        Self::Flag(false)
    }
}

/// Validated assignee behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeMode {
    /// Do not add assignees.
    Off,
    /// Pick assignees from groups, the assignee list, or the chosen reviewers.
    Pick,
    /// Assign the pull request author only.
    Author,
}

impl AddAssignees {
    /// Resolve the raw value into an [`AssigneeMode`].
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::InvalidConfig`] for strings other than `"author"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use autoassign_core::{AddAssignees, AssigneeMode};
    ///
    /// assert_eq!(AddAssignees::Flag(true).mode().unwrap(), AssigneeMode::Pick);
    /// assert_eq!(AddAssignees::Named("author".into()).mode().unwrap(), AssigneeMode::Author);
    /// assert!(AddAssignees::Named("everyone".into()).mode().is_err());
    /// ```
    pub fn mode(&self) -> Result<AssigneeMode, AssignError> {
        match self {
            Self::Flag(false) => Ok(AssigneeMode::Off),
            Self::Flag(true) => Ok(AssigneeMode::Pick),
            Self::Named(name) if name == "author" => Ok(AssigneeMode::Author),
            Self::Named(_) => Err(AssignError::InvalidConfig(
                "Error in configuration file to do with using addAssignees. Expected 'addAssignees' variable to be either boolean or 'author'".into(),
            )),
        }
    }
}

/// Named candidate groups, kept in declaration order.
///
/// # Examples
///
/// ```
/// use autoassign_core::Groups;
///
/// let groups: Groups = [
///     ("backend".to_string(), vec!["alice".to_string()]),
///     ("frontend".to_string(), vec!["bob".to_string()]),
/// ]
/// .into_iter()
/// .collect();
/// let names: Vec<&str> = groups.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, ["backend", "frontend"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groups(Vec<(String, Vec<String>)>);

impl Groups {
    /// Iterate `(name, members)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, Vec<String>)> for Groups {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Groups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, members) in &self.0 {
            map.serialize_entry(name, members)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Groups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = Groups;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of group names to login lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Groups, A::Error> {
                let mut groups = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, members)) = access.next_entry::<String, Vec<String>>()? {
                    match groups.iter_mut().find(|(existing, _)| *existing == name) {
                        Some((_, slot)) => *slot = members,
                        None => groups.push((name, members)),
                    }
                }
                Ok(Groups(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

/// Loads configuration from a file on the local filesystem.
///
/// A missing file counts as "no configuration" rather than an I/O error.
#[derive(Debug, Clone)]
pub struct FileConfigLoader {
    path: PathBuf,
}

impl FileConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigLoader for FileConfigLoader {
    async fn load(&self) -> Result<Option<Configuration>, AssignError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no configuration file");
            return Ok(None);
        }
        Configuration::from_file(&self.path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = Configuration::from_toml("").unwrap();
        assert_eq!(config, Configuration::default());
        assert!(!config.add_reviewers);
        assert_eq!(config.add_assignees, AddAssignees::Flag(false));
        assert_eq!(config.number_of_reviewers, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
addReviewers = true
addAssignees = "author"
reviewers = ["reviewerA", "acme/core"]
assignees = ["maintainerX"]
numberOfReviewers = 2
numberOfAssignees = 1
skipKeywords = ["wip"]
skipUsers = ["dependabot[bot]"]
reviewersInTeams = ["acme/backend"]
useReviewGroups = true

[reviewGroups]
zeta = ["z1", "z2"]
alpha = ["a1"]
"#;
        let config = Configuration::from_toml(toml).unwrap();
        assert!(config.add_reviewers);
        assert_eq!(config.add_assignees.mode().unwrap(), AssigneeMode::Author);
        assert_eq!(config.reviewers, vec!["reviewerA", "acme/core"]);
        assert_eq!(config.assignees.as_deref(), Some(&["maintainerX".to_string()][..]));
        assert_eq!(config.assignee_count(), 1);
        assert_eq!(config.skip_users.as_deref().map(|u| u.len()), Some(1));

        let groups = config.review_groups.as_ref().unwrap();
        let names: Vec<&str> = groups.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta", "alpha"], "declaration order is kept");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn assignee_count_falls_back_to_reviewers() {
        let config = Configuration::from_toml("numberOfReviewers = 3").unwrap();
        assert_eq!(config.assignee_count(), 3);

        let config =
            Configuration::from_toml("numberOfReviewers = 3\nnumberOfAssignees = 0").unwrap();
        assert_eq!(config.assignee_count(), 0, "explicit zero means everyone");
    }

    #[test]
    fn review_groups_flag_requires_groups() {
        let config = Configuration::from_toml("useReviewGroups = true").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'reviewGroups' variable to be set"));
    }

    #[test]
    fn assignee_groups_flag_requires_groups() {
        let config = Configuration::from_toml("useAssigneeGroups = true").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'assigneeGroups' variable to be set"));
    }

    #[test]
    fn unsupported_add_assignees_string_is_rejected() {
        let config = Configuration::from_toml(r#"addAssignees = "test""#).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in configuration file to do with using addAssignees. Expected 'addAssignees' variable to be either boolean or 'author'"
        );
    }

    #[test]
    fn malformed_team_entry_is_rejected() {
        let config = Configuration::from_toml(r#"reviewersInTeams = ["just-a-team"]"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("just-a-team"));
    }

    #[test]
    fn negative_count_is_a_parse_error() {
        assert!(Configuration::from_toml("numberOfReviewers = -1").is_err());
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(Configuration::from_toml("{{invalid}}").is_err());
    }

    #[tokio::test]
    async fn file_loader_treats_missing_file_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileConfigLoader::new(dir.path().join("auto_assign.toml"));
        assert!(loader.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_loader_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auto_assign.toml");
        std::fs::write(&path, "addReviewers = true\nreviewers = [\"alice\"]\n").unwrap();

        let config = FileConfigLoader::new(&path).load().await.unwrap().unwrap();
        assert!(config.add_reviewers);
        assert_eq!(config.reviewers, vec!["alice"]);
    }
}
