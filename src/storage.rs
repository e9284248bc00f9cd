pub mod members;
pub mod migrations;
pub mod users;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::error::{BotError, BotResult};

/// SQLite store shared by the whole process, holding the user cache and the
/// group members. Opened once at startup.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> BotResult<Self> {
        let conn = Connection::open(path)?;

        // WAL mode so readers never see a half-written row
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> BotResult<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> BotResult<T>
    where
        F: FnOnce(&Connection) -> BotResult<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BotError::Storage(format!("DB lock poisoned: {}", e)))?;
        f(&conn)
    }
}
