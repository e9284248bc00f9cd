use crate::{
    core::{
        commands::Command,
        leaderboard::{rank, stale_members, Standing, Statistic},
        templates::MessageTemplate,
    },
    error::{BotError, BotResult},
    github::{client::ProfileProvider, profile::ProfileRecord},
    storage::{users::CachedUser, Database},
};

use chrono::{Duration, Utc};
use minijinja::context;
use std::{fmt, sync::Arc};
use tracing::{error, info, warn};

pub struct HandlerOptions {
    pub freshness_window: Duration,
    // Re-fetch members with stale statistics before ranking them
    pub refresh_stale: bool,
    pub profile_url: String,
}

/// Runs the bot commands against the store and the profile provider.
pub struct CommandHandler<P> {
    db: Arc<Database>,
    provider: P,
    options: HandlerOptions,
}

#[derive(Debug)]
pub enum Reply {
    Help,
    Profile(ProfileRecord),
    Added {
        profile: ProfileRecord,
        already_tracked: bool,
    },
    Removed {
        handle: String,
        was_tracked: bool,
    },
    Leaderboard {
        statistic: Statistic,
        standings: Vec<Standing>,
        profile_url: String,
    },
    FetchFailed(String),
    InvalidCommand(String),
    Failure,
}

impl<P: ProfileProvider> CommandHandler<P> {
    pub fn new(db: Arc<Database>, provider: P, options: HandlerOptions) -> Self {
        CommandHandler {
            db,
            provider,
            options,
        }
    }

    /// Run `command` for `group`. Failures are turned into replies, nothing
    /// escapes the command that caused it.
    pub async fn execute(&self, group: &str, command: Command) -> Reply {
        info!("Executing {command:?} for group {group}");

        let reply = match command {
            Command::Help => Ok(Reply::Help),
            Command::Lookup(handle) => self.lookup(&handle).await,
            Command::Add(handle) => self.add(group, &handle).await,
            Command::Remove(handle) => self.remove(group, &handle),
            Command::Leaderboard(statistic) => self.leaderboard(group, statistic).await,
        };

        reply.unwrap_or_else(Reply::from)
    }

    async fn lookup(&self, handle: &str) -> BotResult<Reply> {
        let profile = self.provider.fetch_profile(handle).await?;
        Ok(Reply::Profile(profile))
    }

    async fn add(&self, group: &str, handle: &str) -> BotResult<Reply> {
        let profile = self.provider.fetch_profile(handle).await?;

        // The cache row is committed before the membership referencing it.
        self.db
            .upsert_user(&CachedUser::from_profile(&profile, Utc::now()))?;

        let already_tracked = match self.db.add_member(group, &profile.handle) {
            Ok(()) => false,
            Err(BotError::DuplicateMembership { .. }) => true,
            Err(e) => return Err(e),
        };

        Ok(Reply::Added {
            profile,
            already_tracked,
        })
    }

    // Memberships hold the handle as GitHub spells it, which may differ in
    // case from what was typed.
    fn remove(&self, group: &str, handle: &str) -> BotResult<Reply> {
        let stored = self
            .db
            .list_members(group)?
            .into_iter()
            .find(|member| member.eq_ignore_ascii_case(handle));

        let Some(stored) = stored else {
            return Ok(Reply::Removed {
                handle: handle.to_string(),
                was_tracked: false,
            });
        };

        let was_tracked = self.db.remove_member(group, &stored)?;
        Ok(Reply::Removed {
            handle: stored,
            was_tracked,
        })
    }

    async fn leaderboard(&self, group: &str, statistic: Statistic) -> BotResult<Reply> {
        if self.options.refresh_stale {
            self.refresh_stale_members(group).await?;
        }

        let standings = rank(&self.db, group, statistic)?;
        Ok(Reply::Leaderboard {
            statistic,
            standings,
            profile_url: self.options.profile_url.clone(),
        })
    }

    // Failed fetches are logged and the cached statistics are used instead.
    async fn refresh_stale_members(&self, group: &str) -> BotResult<()> {
        let stale = stale_members(&self.db, group, Utc::now(), self.options.freshness_window)?;

        for handle in stale {
            match self.provider.fetch_profile(&handle).await {
                Ok(profile) => self
                    .db
                    .upsert_user(&CachedUser::from_profile(&profile, Utc::now()))?,
                Err(e) => warn!("Could not refresh {handle}, serving cached data. {e}"),
            }
        }
        Ok(())
    }
}

impl From<BotError> for Reply {
    fn from(error: BotError) -> Self {
        match error {
            BotError::Fetch { ref handle, .. } => {
                warn!("{error}");
                Reply::FetchFailed(handle.clone())
            }
            BotError::InvalidCommand(reason) => Reply::InvalidCommand(reason),
            error => {
                error!("{error}");
                Reply::Failure
            }
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rendered = match self {
            Reply::Help => MessageTemplate::Help.get().and_then(|t| t.render(context! {})),
            Reply::Profile(profile) => MessageTemplate::Profile.get().and_then(|t| {
                t.render(context! {
                    profile => profile,
                    status => profile.status.as_ref().and_then(|s| s.text()),
                })
            }),
            Reply::Added {
                profile,
                already_tracked,
            } => MessageTemplate::Added.get().and_then(|t| {
                t.render(context! {
                    profile => profile,
                    status => profile.status.as_ref().and_then(|s| s.text()),
                    already_tracked => already_tracked,
                })
            }),
            Reply::Removed {
                handle,
                was_tracked,
            } => MessageTemplate::Removed.get().and_then(|t| {
                t.render(context! {
                    handle => handle,
                    was_tracked => was_tracked,
                })
            }),
            Reply::Leaderboard {
                statistic,
                standings,
                profile_url,
            } => MessageTemplate::Leaderboard.get().and_then(|t| {
                t.render(context! {
                    label => statistic.label(),
                    statistic => statistic.to_string(),
                    profile_url => profile_url,
                    standings => standings
                        .iter()
                        .map(|s| (s.placing.marker(), s.handle.as_str(), s.value))
                        .collect::<Vec<_>>(),
                })
            }),
            Reply::FetchFailed(handle) => MessageTemplate::FetchFailed
                .get()
                .and_then(|t| t.render(context! { handle => handle })),
            Reply::InvalidCommand(reason) => MessageTemplate::InvalidCommand
                .get()
                .and_then(|t| t.render(context! { reason => reason })),
            Reply::Failure => MessageTemplate::Failure.get().and_then(|t| t.render(context! {})),
        };

        let rendered = rendered.map_err(|e| {
            error!("Could not render reply. {e}");
            fmt::Error
        })?;
        write!(f, "{}", rendered)
    }
}
