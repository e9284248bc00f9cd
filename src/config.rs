use crate::cli::Cli;
use crate::error::BotResult;
use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &str = ".env.local.yaml";

// All settings may be configured via environment variables. Example:
// GITHUB_TOKEN="xxx" would set github_token to the xxx value.
// Settings are built once at startup and handed to the components that need them.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    pub slack_token: String,
    pub slack_app_token: String,
    pub github_token: String,
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    // Used to build links to the profiles in rendered messages
    #[serde(default = "default_github_profile_url")]
    pub github_profile_url: String,
    #[serde(default = "default_github_api_timeout_sec")]
    pub github_api_timeout_sec: u64,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_freshness_window_sec")]
    pub freshness_window_sec: u64,
    // Whether the leaderboard is served from the cache without refreshing stale users
    #[serde(default)]
    pub cache_only: bool,
}

impl Settings {
    pub fn new() -> BotResult<Self> {
        let figment = match Path::new(LOCAL_SETTINGS_YAML_FILE).exists() {
            true => {
                println!(
                    "\n######################################\n\
                       ##   Found '.env.local.yaml' file,  ##\n\
                       ##   loading local configuration.   ##\n\
                       ######################################\n\
                    "
                );
                Figment::new().merge(Yaml::file(LOCAL_SETTINGS_YAML_FILE))
            }
            false => Figment::new(),
        };

        Settings::extract_from(figment.merge(Env::raw()).merge(Serialized::defaults(Cli::parse())))
    }

    pub fn extract_from(figment: Figment) -> BotResult<Self> {
        Ok(figment.extract()?)
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn github_api_timeout(&self) -> Duration {
        Duration::from_secs(self.github_api_timeout_sec)
    }

    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.freshness_window_sec as i64)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com/graphql".to_string()
}

fn default_github_profile_url() -> String {
    "https://github.com/".to_string()
}

fn default_github_api_timeout_sec() -> u64 {
    10
}

fn default_database_path() -> String {
    "hubrank.db".to_string()
}

fn default_freshness_window_sec() -> u64 {
    600
}
