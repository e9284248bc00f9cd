use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

use crate::error::BotResult;
use crate::storage::{users::CachedUser, Database};
use crate::utils::format_rank;

const PODIUM: [&'static str; 3] = ["first", "second", "third"];

/// Statistic a leaderboard is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Statistic {
    Commits,
    Prs,
    Repos,
    Issues,
}

impl Statistic {
    pub fn value(&self, user: &CachedUser) -> u64 {
        match self {
            Statistic::Commits => user.commits,
            Statistic::Prs => user.prs,
            Statistic::Repos => user.repos,
            Statistic::Issues => user.issues,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Commits => "Commits",
            Statistic::Prs => "PRs",
            Statistic::Repos => "Repos",
            Statistic::Issues => "Issues",
        }
    }
}

/// Position on the leaderboard. The first three get a podium spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placing {
    Podium(usize),
    Ranked(usize),
}

impl Placing {
    pub fn from_position(position: usize) -> Self {
        match position {
            1..=3 => Placing::Podium(position),
            _ => Placing::Ranked(position),
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Placing::Podium(p) | Placing::Ranked(p) => *p,
        }
    }

    /// Slack markup shown in front of the entry.
    pub fn marker(&self) -> String {
        match self {
            Placing::Podium(p) => match PODIUM.get(p.wrapping_sub(1)) {
                Some(medal) => format!(":{medal}_place_medal:"),
                None => format!("*{}.*", p),
            },
            Placing::Ranked(p) => format!("*{}.*", p),
        }
    }
}

impl fmt::Display for Placing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Placing::Podium(p) => write!(f, "{}", format_rank(*p)),
            Placing::Ranked(p) => write!(f, "{}", p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub placing: Placing,
    pub handle: String,
    pub value: u64,
}

/// Order users by `statistic` (highest first, ties by handle) and assign placings.
pub fn rank_users<'a, I>(users: I, statistic: Statistic) -> Vec<Standing>
where
    I: IntoIterator<Item = &'a CachedUser>,
{
    users
        .into_iter()
        .map(|user| (user.handle.as_str(), statistic.value(user)))
        .sorted_by(|(h1, v1), (h2, v2)| v2.cmp(v1).then_with(|| h1.cmp(h2)))
        .enumerate()
        .map(|(idx, (handle, value))| Standing {
            // idx is zero-based
            placing: Placing::from_position(idx + 1),
            handle: handle.to_string(),
            value,
        })
        .collect()
}

/// Leaderboard of `group` for `statistic`. Members without cached
/// statistics are left out.
pub fn rank(db: &Database, group: &str, statistic: Statistic) -> BotResult<Vec<Standing>> {
    let members = db.list_members(group)?;
    if members.is_empty() {
        return Ok(vec![]);
    }

    let users = db.get_users(&members)?;
    Ok(rank_users(users.values(), statistic))
}

/// Members of `group` whose statistics are missing or older than `window`.
pub fn stale_members(
    db: &Database,
    group: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> BotResult<Vec<String>> {
    let members = db.list_members(group)?;
    let users = db.get_users(&members)?;

    Ok(members
        .into_iter()
        .filter(|handle| match users.get(handle) {
            Some(user) => !user.is_fresh(now, window),
            None => true,
        })
        .sorted()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn user(handle: &str, commits: u64, prs: u64) -> CachedUser {
        CachedUser {
            handle: handle.to_string(),
            commits,
            repos: 1,
            prs,
            issues: 0,
            pronouns: None,
            bio: None,
            status: None,
            last_fetched: Utc::now(),
        }
    }

    fn track(db: &Database, group: &str, user: &CachedUser) {
        db.upsert_user(user).unwrap();
        db.add_member(group, &user.handle).unwrap();
    }

    fn handles_and_values(standings: &[Standing]) -> Vec<(&str, u64)> {
        standings
            .iter()
            .map(|s| (s.handle.as_str(), s.value))
            .collect()
    }

    #[test]
    fn statistic_parsing() {
        assert_eq!(Statistic::from_str("commits").unwrap(), Statistic::Commits);
        assert_eq!(Statistic::from_str("PRs").unwrap(), Statistic::Prs);
        assert_eq!(Statistic::from_str("repos").unwrap(), Statistic::Repos);
        assert_eq!(Statistic::from_str("issues").unwrap(), Statistic::Issues);
        assert!(Statistic::from_str("stars").is_err());
        assert_eq!(Statistic::Prs.to_string(), "prs");
        assert_eq!(Statistic::Prs.label(), "PRs");
    }

    #[test]
    fn ranks_by_value_then_handle() {
        let users = vec![
            user("carol", 5, 0),
            user("alice", 10, 0),
            user("bob", 10, 0),
            user("dave", 20, 0),
        ];

        let standings = rank_users(&users, Statistic::Commits);

        assert_eq!(
            handles_and_values(&standings),
            vec![("dave", 20), ("alice", 10), ("bob", 10), ("carol", 5)]
        );
        assert!(standings.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn podium_then_numbered_placings() {
        let users = (1..=5)
            .map(|i| user(&format!("user{i}"), 100 - i, 0))
            .collect::<Vec<_>>();

        let placings = rank_users(&users, Statistic::Commits)
            .iter()
            .map(|s| s.placing)
            .collect::<Vec<_>>();

        assert_eq!(
            placings,
            vec![
                Placing::Podium(1),
                Placing::Podium(2),
                Placing::Podium(3),
                Placing::Ranked(4),
                Placing::Ranked(5)
            ]
        );
        assert_eq!(placings[0].to_string(), "1st");
        assert_eq!(placings[2].to_string(), "3rd");
        assert_eq!(placings[3].to_string(), "4");
        assert_eq!(placings[1].marker(), ":second_place_medal:");
        assert_eq!(placings[4].marker(), "*5.*");
        assert_eq!(placings[4].position(), 5);
    }

    #[test]
    fn out_of_range_podium_falls_back_to_a_number() {
        assert_eq!(Placing::Podium(0).marker(), "*0.*");
        assert_eq!(Placing::Podium(4).marker(), "*4.*");
    }

    #[test]
    fn ranking_uses_selected_statistic() {
        let db = Database::open_in_memory().unwrap();
        track(&db, "G", &user("alice", 10, 7));
        track(&db, "G", &user("bob", 25, 1));

        let standings = rank(&db, "G", Statistic::Prs).unwrap();
        assert_eq!(handles_and_values(&standings), vec![("alice", 7), ("bob", 1)]);
    }

    #[test]
    fn two_members_ranked_by_commits() {
        let db = Database::open_in_memory().unwrap();
        track(&db, "G", &user("alice", 10, 0));
        track(&db, "G", &user("bob", 25, 0));
        // other groups do not leak into the ranking
        track(&db, "H", &user("carol", 50, 0));

        let standings = rank(&db, "G", Statistic::Commits).unwrap();
        assert_eq!(handles_and_values(&standings), vec![("bob", 25), ("alice", 10)]);
    }

    #[test]
    fn members_without_cache_are_excluded() {
        let db = Database::open_in_memory().unwrap();
        track(&db, "G", &user("alice", 10, 0));
        db.add_member("G", "ghost").unwrap();

        let standings = rank(&db, "G", Statistic::Commits).unwrap();
        assert_eq!(handles_and_values(&standings), vec![("alice", 10)]);
    }

    #[test]
    fn empty_group_has_empty_leaderboard() {
        let db = Database::open_in_memory().unwrap();
        assert!(rank(&db, "G", Statistic::Commits).unwrap().is_empty());
    }

    #[test]
    fn stale_members_include_missing_and_old_rows() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();

        track(&db, "G", &user("fresh", 1, 0));
        let mut old = user("old", 1, 0);
        old.last_fetched = now - Duration::minutes(30);
        track(&db, "G", &old);
        db.add_member("G", "missing").unwrap();

        let stale = stale_members(&db, "G", now, Duration::minutes(10)).unwrap();
        assert_eq!(stale, vec!["missing".to_string(), "old".to_string()]);
    }
}
