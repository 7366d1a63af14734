use autoassign_core::{AssignError, AssigneeMode, Configuration, Groups};
use rand::Rng;

use crate::resolve::{resolve, resolve_from_groups};
use crate::sample::sample;

/// Where assignees come from when `addAssignees = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeSource<'a> {
    /// Sample each of `assigneeGroups` independently.
    Groups(&'a Groups),
    /// Resolve and sample the explicit `assignees` list.
    Explicit(&'a [String]),
    /// Reuse the reviewers already chosen for this pull request.
    Reviewers,
}

impl<'a> AssigneeSource<'a> {
    pub fn from_config(config: &'a Configuration) -> Self {
        match (&config.assignee_groups, &config.assignees) {
            (Some(groups), _) if config.use_assignee_groups && !groups.is_empty() => {
                Self::Groups(groups)
            }
            (_, Some(assignees)) => Self::Explicit(assignees),
            _ => Self::Reviewers,
        }
    }
}

/// Choose assignees for a pull request opened by `actor`.
///
/// `reviewers` is the reviewer list already chosen for this pull request; it
/// is reused as-is when neither assignee groups nor an explicit `assignees`
/// list apply. With `addAssignees = "author"` only the author is assigned, and
/// with `addAssignees = false` nobody is.
///
/// # Errors
///
/// Returns [`AssignError::InvalidConfig`] when `addAssignees` is a string
/// other than `"author"`.
///
/// # Examples
///
/// ```
/// use autoassign_core::Configuration;
/// use autoassign_engine::assignees::choose_assignees;
/// use rand::SeedableRng;
///
/// let config = Configuration::from_toml(r#"addAssignees = "author""#).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let assignees = choose_assignees("pr-creator", &config, &[], &mut rng).unwrap();
/// assert_eq!(assignees, ["pr-creator"]);
/// ```
pub fn choose_assignees<R: Rng + ?Sized>(
    actor: &str,
    config: &Configuration,
    reviewers: &[String],
    rng: &mut R,
) -> Result<Vec<String>, AssignError> {
    match config.add_assignees.mode()? {
        AssigneeMode::Off => return Ok(Vec::new()),
        AssigneeMode::Author => return Ok(vec![actor.to_string()]),
        AssigneeMode::Pick => {}
    }

    let count = config.assignee_count();
    let assignees = match AssigneeSource::from_config(config) {
        AssigneeSource::Groups(groups) => resolve_from_groups(groups, actor, count, rng),
        AssigneeSource::Explicit(candidates) => {
            let resolved = resolve(candidates, actor);
            if !resolved.teams.is_empty() {
                tracing::debug!(teams = ?resolved.teams, "teams cannot be assignees");
            }
            sample(&resolved.users, count, rng)
        }
        AssigneeSource::Reviewers => reviewers.to_vec(),
    };
    Ok(assignees)
}
