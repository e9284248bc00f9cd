use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};

use crate::error::BotResult;
use crate::github::profile::ProfileRecord;
use crate::storage::Database;

/// Last known statistics of a GitHub user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedUser {
    pub handle: String,
    pub commits: u64,
    pub repos: u64,
    pub prs: u64,
    pub issues: u64,
    pub pronouns: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub last_fetched: DateTime<Utc>,
}

impl CachedUser {
    pub fn from_profile(profile: &ProfileRecord, fetched_at: DateTime<Utc>) -> Self {
        CachedUser {
            handle: profile.handle.clone(),
            commits: profile.contributions.commits,
            repos: profile.contributions.repos,
            prs: profile.contributions.prs,
            issues: profile.contributions.issues,
            pronouns: profile.pronouns.clone(),
            bio: profile.bio.clone(),
            status: profile.status.as_ref().and_then(|s| s.text()),
            last_fetched: fetched_at,
        }
    }

    /// Whether the statistics are recent enough to be served without a new fetch.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.last_fetched < window
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(CachedUser {
            handle: row.get(0)?,
            commits: row.get(1)?,
            repos: row.get(2)?,
            prs: row.get(3)?,
            issues: row.get(4)?,
            pronouns: row.get(5)?,
            bio: row.get(6)?,
            status: row.get(7)?,
            last_fetched: row.get(8)?,
        })
    }
}

const SELECT_USER: &str = "SELECT handle, commits, repos, prs, issues, pronouns, bio, status, last_fetched FROM users";

impl Database {
    /// Insert the user, or overwrite every statistic and the fetch time of the
    /// existing row. Runs as one statement.
    pub fn upsert_user(&self, user: &CachedUser) -> BotResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (handle, commits, repos, prs, issues, pronouns, bio, status, last_fetched)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (handle) DO UPDATE SET
                    commits = excluded.commits,
                    repos = excluded.repos,
                    prs = excluded.prs,
                    issues = excluded.issues,
                    pronouns = excluded.pronouns,
                    bio = excluded.bio,
                    status = excluded.status,
                    last_fetched = excluded.last_fetched",
                params![
                    user.handle,
                    user.commits,
                    user.repos,
                    user.prs,
                    user.issues,
                    user.pronouns,
                    user.bio,
                    user.status,
                    user.last_fetched,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, handle: &str) -> BotResult<Option<CachedUser>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    &format!("{SELECT_USER} WHERE handle = ?1"),
                    [handle],
                    CachedUser::from_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Batch-fetch cached users. Handles without a row are left out.
    pub fn get_users(&self, handles: &HashSet<String>) -> BotResult<HashMap<String, CachedUser>> {
        if handles.is_empty() {
            return Ok(HashMap::new());
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=handles.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!("{SELECT_USER} WHERE handle IN ({})", placeholders.join(", "));

            let mut stmt = conn.prepare(&sql)?;
            let users = stmt
                .query_map(
                    rusqlite::params_from_iter(handles.iter()),
                    CachedUser::from_row,
                )?
                .map(|user| user.map(|u| (u.handle.clone(), u)))
                .collect::<Result<HashMap<String, CachedUser>, _>>()?;

            Ok(users)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 1, 12, minute, 0).unwrap()
    }

    fn user(handle: &str, commits: u64, fetched: DateTime<Utc>) -> CachedUser {
        CachedUser {
            handle: handle.to_string(),
            commits,
            repos: 2,
            prs: 3,
            issues: 4,
            pronouns: Some("she/her".to_string()),
            bio: None,
            status: Some(":tada: shipping".to_string()),
            last_fetched: fetched,
        }
    }

    #[test]
    fn upsert_then_get() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_user(&user("alice", 10, at(0))).unwrap();

        assert_eq!(db.get_user("alice").unwrap(), Some(user("alice", 10, at(0))));
        assert_eq!(db.get_user("bob").unwrap(), None);
    }

    #[test]
    fn upsert_overwrites_and_refreshes_timestamp() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_user(&user("alice", 10, at(0))).unwrap();
        db.upsert_user(&user("alice", 10, at(5))).unwrap();

        let cached = db.get_user("alice").unwrap().unwrap();
        assert_eq!(cached, user("alice", 10, at(5)));

        let mut updated = user("alice", 99, at(7));
        updated.pronouns = None;
        db.upsert_user(&updated).unwrap();
        assert_eq!(db.get_user("alice").unwrap(), Some(updated));

        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn handles_are_case_sensitive() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_user(&user("Alice", 1, at(0))).unwrap();

        assert!(db.get_user("alice").unwrap().is_none());
        assert!(db.get_user("Alice").unwrap().is_some());
    }

    #[test]
    fn get_users_omits_unknown_handles() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_user(&user("alice", 1, at(0))).unwrap();
        db.upsert_user(&user("bob", 2, at(0))).unwrap();

        let wanted: HashSet<String> = ["alice", "ghost"].iter().map(|h| h.to_string()).collect();
        let found = db.get_users(&wanted).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found["alice"].commits, 1);
        assert!(db.get_users(&HashSet::new()).unwrap().is_empty());
    }

    #[test]
    fn freshness_window() {
        let cached = user("alice", 1, at(0));
        let window = Duration::minutes(10);

        assert!(cached.is_fresh(at(9), window));
        assert!(!cached.is_fresh(at(10), window));
        assert!(!cached.is_fresh(at(30), window));
    }
}
