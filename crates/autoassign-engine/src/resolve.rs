use autoassign_core::{Groups, SelectionResult};
use rand::Rng;

use crate::sample::sample;

/// Team slug of a candidate entry, if it names a team.
///
/// Any entry containing `/` is a team; the slug is the text after the last
/// separator, so `org/core` and `/core` both name the `core` team.
///
/// # Examples
///
/// ```
/// use autoassign_engine::resolve::team_slug;
///
/// assert_eq!(team_slug("acme/core"), Some("core"));
/// assert_eq!(team_slug("/core"), Some("core"));
/// assert_eq!(team_slug("octocat"), None);
/// ```
pub fn team_slug(candidate: &str) -> Option<&str> {
    candidate.rsplit_once('/').map(|(_, slug)| slug)
}

/// Split candidates into users and teams, dropping `exclude_login`.
///
/// Only user entries are compared against `exclude_login`; teams always pass
/// through. Duplicates are removed, keeping the first occurrence. Team entries
/// with nothing after the separator are ignored.
///
/// # Examples
///
/// ```
/// use autoassign_engine::resolve::resolve;
///
/// let candidates: Vec<String> = ["alice", "owner", "acme/core", "bob"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let result = resolve(&candidates, "owner");
/// assert_eq!(result.users, ["alice", "bob"]);
/// assert_eq!(result.teams, ["core"]);
/// ```
pub fn resolve(candidates: &[String], exclude_login: &str) -> SelectionResult {
    let mut result = SelectionResult::default();
    for candidate in candidates {
        match team_slug(candidate) {
            Some("") => {
                tracing::debug!(%candidate, "ignoring team reference without a slug");
            }
            Some(slug) => push_unique(&mut result.teams, slug),
            None if candidate == exclude_login => {}
            None => push_unique(&mut result.users, candidate),
        }
    }
    result
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// Resolve and sample every group independently, concatenating the picks.
///
/// Groups are visited in declaration order. Each contributes at most `count`
/// users (everyone when `count` is `0`); a group left empty after excluding
/// `exclude_login` contributes nothing and siblings do not make up for it.
/// Team entries inside groups are not selected.
///
/// # Examples
///
/// ```
/// use autoassign_core::Groups;
/// use autoassign_engine::resolve::resolve_from_groups;
/// use rand::SeedableRng;
///
/// let groups: Groups = [
///     ("groupA".to_string(), vec!["owner".to_string()]),
///     ("groupB".to_string(), vec!["u1".to_string()]),
/// ]
/// .into_iter()
/// .collect();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// assert_eq!(resolve_from_groups(&groups, "owner", 1, &mut rng), ["u1"]);
/// ```
pub fn resolve_from_groups<R: Rng + ?Sized>(
    groups: &Groups,
    exclude_login: &str,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut chosen = Vec::new();
    for (name, members) in groups.iter() {
        let resolved = resolve(members, exclude_login);
        if !resolved.teams.is_empty() {
            tracing::debug!(group = name, teams = ?resolved.teams, "team entries in groups are not selected");
        }
        let picked = sample(&resolved.users, count, rng);
        tracing::debug!(group = name, picked = ?picked, "group selection");
        chosen.extend(picked);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn logins(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn groups(entries: &[(&str, &[&str])]) -> Groups {
        entries
            .iter()
            .map(|(name, members)| (name.to_string(), logins(members)))
            .collect()
    }

    #[test]
    fn excludes_only_the_matching_user() {
        let result = resolve(&logins(&["r1", "r2", "r3", "owner"]), "owner");
        assert_eq!(result.users, ["r1", "r2", "r3"]);
        assert!(result.teams.is_empty());
    }

    #[test]
    fn exclusion_is_exact() {
        let result = resolve(&logins(&["Owner", "owner2"]), "owner");
        assert_eq!(result.users, ["Owner", "owner2"]);
    }

    #[test]
    fn teams_are_never_excluded_by_login() {
        let result = resolve(&logins(&["acme/owner", "owner"]), "owner");
        assert!(result.users.is_empty());
        assert_eq!(result.teams, ["owner"]);
    }

    #[test]
    fn team_without_org_uses_text_after_slash() {
        let result = resolve(&logins(&["/team_reviewer1"]), "pr-creator");
        assert!(result.users.is_empty());
        assert_eq!(result.teams, ["team_reviewer1"]);
    }

    #[test]
    fn team_slug_comes_after_last_separator() {
        assert_eq!(team_slug("enterprise/acme/core"), Some("core"));
    }

    #[test]
    fn empty_slug_is_dropped() {
        let result = resolve(&logins(&["acme/", "alice"]), "owner");
        assert_eq!(result.users, ["alice"]);
        assert!(result.teams.is_empty());
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let result = resolve(&logins(&["bob", "alice", "bob", "x/core", "y/core"]), "owner");
        assert_eq!(result.users, ["bob", "alice"]);
        assert_eq!(result.teams, ["core"]);
    }

    #[test]
    fn groups_with_only_the_author_contribute_nothing() {
        let groups = groups(&[("groupA", &["owner"]), ("groupB", &["u1"])]);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(resolve_from_groups(&groups, "owner", 1, &mut rng), ["u1"]);
    }

    #[test]
    fn small_group_is_not_made_up_by_siblings() {
        let groups = groups(&[
            ("small", &["owner", "s1"]),
            ("large", &["l1", "l2", "l3", "l4", "l5"]),
        ]);
        let mut rng = StdRng::seed_from_u64(11);
        let chosen = resolve_from_groups(&groups, "owner", 3, &mut rng);

        assert_eq!(chosen.len(), 1 + 3);
        assert_eq!(chosen[0], "s1");
        assert!(chosen[1..].iter().all(|c| c.starts_with('l')));
    }

    #[test]
    fn zero_count_takes_every_group_member() {
        let groups = groups(&[("a", &["a1", "a2"]), ("b", &["b1", "owner"])]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            resolve_from_groups(&groups, "owner", 0, &mut rng),
            ["a1", "a2", "b1"]
        );
    }

    #[test]
    fn groups_follow_declaration_order() {
        let groups = groups(&[("zeta", &["z1"]), ("alpha", &["a1"])]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_from_groups(&groups, "owner", 0, &mut rng), ["z1", "a1"]);
    }

    #[test]
    fn team_entries_in_groups_are_not_selected() {
        let groups = groups(&[("mixed", &["acme/core", "m1"])]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_from_groups(&groups, "owner", 0, &mut rng), ["m1"]);
    }
}
