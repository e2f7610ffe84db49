/// Candidate collection: role filtering followed by tag set narrowing
use super::Candidates;
use crate::core::{Connection, RoleSet};
use crate::error::SelectionError;
use crate::read_preference::{ReadPreference, TagSet};
use tracing::{debug, Level};

use crate::LOG_TARGET;

/// Collect every connection whose role is eligible for the read preference's
/// mode, then narrow by the first tag set that matches anything.
///
/// Registry order is preserved. Fails with `NoMatchingServer` when role or
/// tag filtering leaves nothing.
pub fn find_candidates<'a>(
    connections: &'a [Connection],
    rp: &ReadPreference,
) -> Result<Candidates<'a>, SelectionError> {
    debug!(target: LOG_TARGET, "finding candidate servers for {}", rp.mode);

    let all = filter_by_roles(connections, rp.mode.eligible_roles());
    if all.is_empty() {
        debug!(target: LOG_TARGET, "no connection has an eligible role");
        return Err(SelectionError::NoMatchingServer);
    }

    if rp.tag_sets().is_empty() {
        return Ok(all);
    }

    debug!(target: LOG_TARGET, "limiting by tag sets");
    filter_by_tag_sets(&all, rp.tag_sets()).ok_or(SelectionError::NoMatchingServer)
}

fn filter_by_roles(connections: &[Connection], roles: RoleSet) -> Candidates<'_> {
    debug!(target: LOG_TARGET, "filter_by_roles: adding connections:");
    let candidates: Candidates<'_> = connections
        .iter()
        .filter(|con| roles.admits(con.role))
        .inspect(|con| con.trace(Level::DEBUG))
        .collect();
    debug!(target: LOG_TARGET, "filter_by_roles: done");
    candidates
}

/// Try each tag set in order and return the matches of the first one that
/// matches at least one candidate. Later tag sets are never looked at.
fn filter_by_tag_sets<'a>(candidates: &[&'a Connection], tag_sets: &[TagSet]) -> Option<Candidates<'a>> {
    for tag_set in tag_sets {
        debug!(target: LOG_TARGET, "checking tag set: {}", tag_set);

        let filtered: Candidates<'a> = candidates
            .iter()
            .copied()
            .filter(|con| candidate_matches(con, tag_set))
            .collect();

        debug!(
            target: LOG_TARGET,
            "tag set {} matched {} candidates",
            tag_set,
            filtered.len()
        );
        if !filtered.is_empty() {
            return Some(filtered);
        }
    }
    None
}

fn candidate_matches(con: &Connection, tag_set: &TagSet) -> bool {
    let matched = tag_set.matches(con);
    if matched {
        debug!(target: LOG_TARGET, "all tags matched for {}", con.id);
    } else {
        debug!(target: LOG_TARGET, "not all tags matched for {}", con.id);
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeRole;
    use crate::read_preference::ReadMode;

    fn registry() -> Vec<Connection> {
        vec![
            Connection::new("standalone", NodeRole::Standalone, 3),
            Connection::new("primary", NodeRole::Primary, 10).with_tag("dc", "west"),
            Connection::new("sec-east", NodeRole::Secondary, 5)
                .with_tag("dc", "east")
                .with_tag("rack", "2"),
            Connection::new("arbiter", NodeRole::Arbiter, 1),
            Connection::new("sec-west", NodeRole::Secondary, 40).with_tag("dc", "west"),
            Connection::new("mongos", NodeRole::RouterProxy, 8),
        ]
    }

    fn ids(candidates: &[&Connection]) -> Vec<String> {
        candidates.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_every_candidate_has_eligible_role() {
        let connections = registry();
        for mode in ReadMode::ALL {
            let rp = ReadPreference::new(mode);
            let candidates = find_candidates(&connections, &rp).unwrap();
            assert!(!candidates.is_empty());
            for con in candidates {
                assert!(mode.eligible_roles().admits(con.role), "{} under {}", con.id, mode);
            }
        }
    }

    #[test]
    fn test_role_filtering_preserves_registry_order() {
        let connections = registry();

        let rp = ReadPreference::new(ReadMode::SecondaryPreferred);
        let candidates = find_candidates(&connections, &rp).unwrap();
        assert_eq!(ids(&candidates), vec!["primary", "sec-east", "sec-west"]);

        let rp = ReadPreference::new(ReadMode::Nearest);
        let candidates = find_candidates(&connections, &rp).unwrap();
        assert_eq!(
            ids(&candidates),
            vec!["standalone", "primary", "sec-east", "sec-west", "mongos"]
        );
    }

    #[test]
    fn test_no_primary_is_no_matching_server() {
        let connections = vec![
            Connection::new("a", NodeRole::Secondary, 5),
            Connection::new("b", NodeRole::Arbiter, 5),
        ];
        let rp = ReadPreference::new(ReadMode::Primary);
        assert_eq!(
            find_candidates(&connections, &rp),
            Err(SelectionError::NoMatchingServer)
        );
    }

    #[test]
    fn test_first_matching_tag_set_wins() {
        let connections = registry();
        let rp = ReadPreference::new(ReadMode::Nearest)
            .with_tag_set("dc:north".parse().unwrap())
            .with_tag_set("dc:west".parse().unwrap())
            .with_tag_set("dc:east".parse().unwrap());

        let candidates = find_candidates(&connections, &rp).unwrap();
        assert_eq!(ids(&candidates), vec!["primary", "sec-west"]);
    }

    #[test]
    fn test_tag_set_is_conjunctive() {
        let connections = registry();
        let rp = ReadPreference::new(ReadMode::Secondary)
            .with_tag_set("dc:east,rack:1".parse().unwrap())
            .with_tag_set("dc:east,rack:2".parse().unwrap());

        let candidates = find_candidates(&connections, &rp).unwrap();
        assert_eq!(ids(&candidates), vec!["sec-east"]);
    }

    #[test]
    fn test_empty_tag_set_matches_everything() {
        let connections = registry();
        let rp = ReadPreference::new(ReadMode::Secondary)
            .with_tag_set("dc:south".parse().unwrap())
            .with_tag_set(TagSet::new());

        let candidates = find_candidates(&connections, &rp).unwrap();
        assert_eq!(ids(&candidates), vec!["sec-east", "sec-west"]);
    }

    #[test]
    fn test_unmatched_tags_is_no_matching_server() {
        let connections = registry();
        let rp = ReadPreference::new(ReadMode::Secondary).with_tag_set("dc:south".parse().unwrap());
        assert_eq!(
            find_candidates(&connections, &rp),
            Err(SelectionError::NoMatchingServer)
        );
    }

    #[test]
    fn test_tags_only_match_role_eligible_servers() {
        let connections = registry();
        // The only primary is tagged dc:west
        let rp = ReadPreference::new(ReadMode::Primary).with_tag_set("dc:east".parse().unwrap());
        assert_eq!(
            find_candidates(&connections, &rp),
            Err(SelectionError::NoMatchingServer)
        );
    }

    #[test]
    fn test_empty_registry() {
        let rp = ReadPreference::new(ReadMode::Nearest);
        assert_eq!(find_candidates(&[], &rp), Err(SelectionError::NoMatchingServer));
    }
}
