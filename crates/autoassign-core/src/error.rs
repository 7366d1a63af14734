use std::path::PathBuf;

/// Errors that can occur while selecting and applying reviewers and assignees.
///
/// Configuration problems and team lookups are fatal for a run. Submission
/// failures are reported with [`AssignError::GitHub`] and are caught by the
/// handler, so one failed phase never blocks the other.
///
/// # Examples
///
/// ```
/// use autoassign_core::AssignError;
///
/// let err = AssignError::ConfigMissing;
/// assert_eq!(err.to_string(), "the configuration file failed to load");
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AssignError {
    /// No configuration could be loaded for the repository.
    #[error("the configuration file failed to load")]
    #[diagnostic(
        code(autoassign::config::missing),
        help("create .github/auto_assign.toml, or run `autoassign init`")
    )]
    ConfigMissing,

    /// The configuration loaded but is not usable.
    #[error("{0}")]
    #[diagnostic(code(autoassign::config::invalid))]
    InvalidConfig(String),

    /// The team slug could not be resolved to a team id.
    #[error("cannot resolve team id for {org}/{team}: {reason}")]
    #[diagnostic(code(autoassign::team::not_found))]
    TeamNotFound {
        org: String,
        team: String,
        reason: String,
    },

    /// The team resolved but its members could not be listed.
    #[error("cannot list members of team {org}/{team}: {reason}")]
    #[diagnostic(code(autoassign::team::members))]
    TeamMembers {
        org: String,
        team: String,
        reason: String,
    },

    /// GitHub API or network failure.
    #[error("GitHub API error: {0}")]
    #[diagnostic(code(autoassign::github))]
    GitHub(String),

    /// The pull request event payload is malformed.
    #[error("invalid event payload: {0}")]
    #[diagnostic(code(autoassign::event))]
    Event(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
