use rusqlite::Connection;
use tracing::info;

use crate::error::BotResult;

pub fn run(conn: &Connection) -> BotResult<()> {
    // group_members.handle points at users.handle without a FOREIGN KEY:
    // removing a member never touches the cache, and the cache row may be
    // missing for a member.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            handle          TEXT PRIMARY KEY,
            commits         INTEGER NOT NULL DEFAULT 0,
            repos           INTEGER NOT NULL DEFAULT 0,
            prs             INTEGER NOT NULL DEFAULT 0,
            issues          INTEGER NOT NULL DEFAULT 0,
            pronouns        TEXT,
            bio             TEXT,
            status          TEXT,
            last_fetched    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS group_members (
            group_key   TEXT NOT NULL,
            handle      TEXT NOT NULL,
            PRIMARY KEY (group_key, handle)
        );

        CREATE INDEX IF NOT EXISTS idx_group_members_handle
            ON group_members(handle);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
