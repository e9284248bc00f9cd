use std::error::Error;
use std::fmt;

/// Custom Error and Result types to unify errors from all sources.
pub type BotResult<T> = Result<T, BotError>;

#[derive(Debug)]
pub enum BotError {
    Http(String),
    // Profile could not be retrieved from GitHub for this handle.
    Fetch { handle: String, cause: String },
    Storage(String),
    DuplicateMembership { group: String, handle: String },
    InvalidCommand(String),
    Config(String),
    Slack(String),
}

impl BotError {
    pub fn fetch(handle: &str, cause: impl fmt::Display) -> Self {
        BotError::Fetch {
            handle: handle.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BotError::Http(s) => write!(f, "HTTP Error: {}", s),
            BotError::Fetch { handle, cause } => {
                write!(f, "Fetch Error: failed to get user info for {}. {}", handle, cause)
            }
            BotError::Storage(s) => write!(f, "Storage Error: {}", s),
            BotError::DuplicateMembership { group, handle } => {
                write!(f, "Duplicate Membership: {} is already tracked in {}", handle, group)
            }
            BotError::InvalidCommand(s) => write!(f, "Invalid Command: {}", s),
            BotError::Config(s) => write!(f, "Config Error: {}", s),
            BotError::Slack(s) => write!(f, "Slack Error: {}", s),
        }
    }
}

impl Error for BotError {}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::Http(error.to_string())
    }
}

impl From<rusqlite::Error> for BotError {
    fn from(error: rusqlite::Error) -> Self {
        BotError::Storage(error.to_string())
    }
}

impl From<figment::Error> for BotError {
    fn from(error: figment::Error) -> Self {
        BotError::Config(error.to_string())
    }
}
