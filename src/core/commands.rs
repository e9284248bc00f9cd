use crate::{
    core::leaderboard::Statistic,
    error::{BotError, BotResult},
};

use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

const COMMANDS: [&'static str; 5] = ["!help", "!user", "!add", "!remove", "!leaderboard"];
// All words (GitHub handles may contain dashes), with optional "!" prefix
static REGEX_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?[\w-]+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Lookup(String),
    Add(String),
    Remove(String),
    Leaderboard(Statistic),
}

impl Command {
    pub fn is_command(input: &str) -> bool {
        REGEX_WORDS
            .find_iter(input)
            .map(|mat| mat.as_str())
            .next()
            .map(|start_with| COMMANDS.contains(&start_with))
            .unwrap_or_default()
    }

    pub fn build_from(input: &str) -> BotResult<Command> {
        let mut input = REGEX_WORDS.find_iter(input).map(|mat| mat.as_str());
        let start_with = input.next().unwrap_or_default();

        let mut handle = |cmd: &str| {
            input
                .next()
                .map(|h| h.to_string())
                .ok_or_else(|| BotError::InvalidCommand(format!("`{cmd}` expects a GitHub username")))
        };

        match start_with {
            cmd if cmd == COMMANDS[0] => Ok(Command::Help),
            cmd if cmd == COMMANDS[1] => Ok(Command::Lookup(handle(cmd)?)),
            cmd if cmd == COMMANDS[2] => Ok(Command::Add(handle(cmd)?)),
            cmd if cmd == COMMANDS[3] => Ok(Command::Remove(handle(cmd)?)),
            cmd if cmd == COMMANDS[4] => {
                // !leaderboard [commits|prs|repos|issues], commits by default
                let statistic = match input.next() {
                    Some(stat) => Statistic::from_str(stat).map_err(|_| {
                        BotError::InvalidCommand(format!(
                            "unknown statistic `{stat}`, expected one of commits, prs, repos, issues"
                        ))
                    })?,
                    None => Statistic::Commits,
                };
                Ok(Command::Leaderboard(statistic))
            }
            other => Err(BotError::InvalidCommand(format!("unknown command `{other}`"))),
        }
    }
}
