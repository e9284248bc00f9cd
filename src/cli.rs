use clap::Parser;
use serde::Serialize;

fn is_false(b: &bool) -> bool {
    !b
}

#[derive(Debug, Parser, Serialize)]
pub struct Cli {
    /// Path to the SQLite database holding the user cache and group members
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,

    /// Age (in seconds) after which cached statistics are considered stale
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freshness_window_sec: Option<u64>,

    /// Always serve the leaderboard from the cache, never refreshing stale users
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub cache_only: bool,
}
