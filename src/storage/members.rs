use std::collections::HashSet;

use crate::error::{BotError, BotResult};
use crate::storage::Database;

impl Database {
    /// Track `handle` in `group`. Adding a pair twice leaves a single row and
    /// reports `DuplicateMembership`.
    pub fn add_member(&self, group: &str, handle: &str) -> BotResult<()> {
        let inserted = self.with_conn(|conn| {
            Ok(conn.execute(
                "INSERT OR IGNORE INTO group_members (group_key, handle) VALUES (?1, ?2)",
                (group, handle),
            )?)
        })?;

        match inserted {
            0 => Err(BotError::DuplicateMembership {
                group: group.to_string(),
                handle: handle.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Stop tracking `handle` in `group`. Returns whether a row was removed.
    /// The cached statistics are kept for the other groups.
    pub fn remove_member(&self, group: &str, handle: &str) -> BotResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM group_members WHERE group_key = ?1 AND handle = ?2",
                (group, handle),
            )?;
            Ok(removed > 0)
        })
    }

    pub fn list_members(&self, group: &str) -> BotResult<HashSet<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT handle FROM group_members WHERE group_key = ?1")?;
            let handles = stmt
                .query_map([group], |row| row.get::<_, String>(0))?
                .collect::<Result<HashSet<String>, _>>()?;
            Ok(handles)
        })
    }
}
