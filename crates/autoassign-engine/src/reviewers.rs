use autoassign_core::{Configuration, Groups, ReviewerSelection};
use rand::Rng;

use crate::resolve::{resolve, resolve_from_groups};
use crate::sample::sample;

/// Where reviewer candidates come from, chosen from configuration flags.
///
/// Precedence: named groups (when enabled and non-empty), then the flat
/// `reviewers` list together with expanded team members, then nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewerSource<'a> {
    /// Sample each of `reviewGroups` independently.
    Groups(&'a Groups),
    /// The flat `reviewers` list plus members of `reviewersInTeams`.
    Flat {
        candidates: &'a [String],
        team_members: &'a [String],
    },
    /// Nothing configured.
    None,
}

impl<'a> ReviewerSource<'a> {
    /// Pick the source for `config`. `team_members` are the logins already
    /// fetched for `reviewersInTeams`.
    pub fn from_config(config: &'a Configuration, team_members: &'a [String]) -> Self {
        match &config.review_groups {
            Some(groups) if config.use_review_groups && !groups.is_empty() => {
                Self::Groups(groups)
            }
            _ if !config.reviewers.is_empty() || !team_members.is_empty() => Self::Flat {
                candidates: &config.reviewers,
                team_members,
            },
            _ => Self::None,
        }
    }
}

/// Choose reviewers and team reviewers for a pull request opened by `actor`.
///
/// Team members are treated as plain logins: they are merged into the user
/// pool (deduplicated) before the author is excluded and the pool sampled.
/// Team entries from `reviewers` are always requested in full.
///
/// # Examples
///
/// ```
/// use autoassign_core::Configuration;
/// use autoassign_engine::reviewers::choose_reviewers;
/// use rand::SeedableRng;
///
/// let config = Configuration::from_toml(r#"
/// reviewers = ["r1", "r2", "r3", "owner"]
/// numberOfReviewers = 0
/// "#).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let selection = choose_reviewers("owner", &config, &[], &mut rng);
/// assert_eq!(selection.reviewers, ["r1", "r2", "r3"]);
/// ```
pub fn choose_reviewers<R: Rng + ?Sized>(
    actor: &str,
    config: &Configuration,
    team_members: &[String],
    rng: &mut R,
) -> ReviewerSelection {
    let count = config.number_of_reviewers;
    match ReviewerSource::from_config(config, team_members) {
        ReviewerSource::Groups(groups) => ReviewerSelection {
            reviewers: resolve_from_groups(groups, actor, count, rng),
            team_reviewers: Vec::new(),
        },
        ReviewerSource::Flat {
            candidates,
            team_members,
        } => {
            let mut resolved = resolve(candidates, actor);
            for member in team_members {
                if member != actor && !resolved.users.contains(member) {
                    resolved.users.push(member.clone());
                }
            }
            ReviewerSelection {
                reviewers: sample(&resolved.users, count, rng),
                team_reviewers: resolved.teams,
            }
        }
        ReviewerSource::None => ReviewerSelection::default(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn config(toml: &str) -> Configuration {
        Configuration::from_toml(toml).unwrap()
    }

    fn logins(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn nothing_configured_selects_nobody() {
        let mut rng = StdRng::seed_from_u64(0);
        let selection = choose_reviewers("owner", &config(""), &[], &mut rng);
        assert!(selection.is_empty());
    }

    #[test]
    fn author_alone_yields_no_reviewers() {
        let mut rng = StdRng::seed_from_u64(0);
        let selection = choose_reviewers("owner", &config(r#"reviewers = ["owner"]"#), &[], &mut rng);
        assert!(selection.is_empty());
    }

    #[test]
    fn samples_users_but_passes_all_teams() {
        let cfg = config(
            r#"
reviewers = ["u1", "u2", "u3", "acme/core", "acme/web"]
numberOfReviewers = 1
"#,
        );
        let mut rng = StdRng::seed_from_u64(3);
        let selection = choose_reviewers("owner", &cfg, &[], &mut rng);
        assert_eq!(selection.reviewers.len(), 1);
        assert_eq!(selection.team_reviewers, ["core", "web"]);
    }

    #[test]
    fn team_only_reviewers() {
        let cfg = config(r#"reviewers = ["/team_reviewer1"]"#);
        let mut rng = StdRng::seed_from_u64(0);
        let selection = choose_reviewers("pr-creator", &cfg, &[], &mut rng);
        assert!(selection.reviewers.is_empty());
        assert_eq!(selection.team_reviewers, ["team_reviewer1"]);
    }

    #[test]
    fn groups_take_precedence_and_never_yield_teams() {
        let cfg = config(
            r#"
reviewers = ["flat1", "acme/core"]
useReviewGroups = true
numberOfReviewers = 1

[reviewGroups]
groupA = ["owner"]
groupB = ["u1"]
"#,
        );
        let mut rng = StdRng::seed_from_u64(0);
        let selection = choose_reviewers("owner", &cfg, &[], &mut rng);
        assert_eq!(selection.reviewers, ["u1"]);
        assert!(selection.team_reviewers.is_empty());
    }

    #[test]
    fn empty_groups_fall_back_to_flat_list() {
        let cfg = config(
            r#"
reviewers = ["flat1"]
useReviewGroups = true
[reviewGroups]
"#,
        );
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            ReviewerSource::from_config(&cfg, &[]),
            ReviewerSource::Flat {
                candidates: &cfg.reviewers,
                team_members: &[],
            }
        );
        let selection = choose_reviewers("owner", &cfg, &[], &mut rng);
        assert_eq!(selection.reviewers, ["flat1"]);
    }

    #[test]
    fn groups_ignored_when_flag_is_off() {
        let cfg = config(
            r#"
reviewers = ["flat1"]
[reviewGroups]
groupA = ["g1"]
"#,
        );
        let mut rng = StdRng::seed_from_u64(0);
        let selection = choose_reviewers("owner", &cfg, &[], &mut rng);
        assert_eq!(selection.reviewers, ["flat1"]);
    }

    #[test]
    fn team_members_merge_into_pool_without_duplicates() {
        let cfg = config(
            r#"
reviewers = ["Robin"]
numberOfReviewers = 2
reviewersInTeams = ["org/team"]
"#,
        );
        let members = logins(&["Robin", "Raven"]);
        let mut rng = StdRng::seed_from_u64(1);
        let selection = choose_reviewers("owner", &cfg, &members, &mut rng);

        assert_eq!(selection.reviewers.len(), 2);
        let picked: HashSet<&str> = selection.reviewers.iter().map(String::as_str).collect();
        assert_eq!(picked, HashSet::from(["Robin", "Raven"]));
    }

    #[test]
    fn team_members_exclude_the_author() {
        let members = logins(&["owner", "m1"]);
        let mut rng = StdRng::seed_from_u64(0);
        let selection = choose_reviewers("owner", &config(""), &members, &mut rng);
        assert_eq!(selection.reviewers, ["m1"]);
    }
}
