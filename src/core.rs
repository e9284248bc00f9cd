pub mod commands;
pub mod handler;
pub mod leaderboard;
pub mod templates;
