use serde::{Deserialize, Serialize};

use crate::error::{BotError, BotResult};

pub const USER_QUERY: &str = r#"
query ($login: String!) {
  user (login: $login) {
    avatarUrl
    bio
    pronouns
    url
    name
    status {
      emoji
      message
    }
    login
    contributionsCollection {
      totalCommitContributions
      totalRepositoryContributions
      pullRequestContributions {
        totalCount
      }
      issueContributions {
        totalCount
      }
    }
  }
}
"#;

/// Profile of a GitHub user as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRecord {
    pub handle: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub profile_url: String,
    pub bio: Option<String>,
    pub pronouns: Option<String>,
    pub status: Option<Status>,
    pub contributions: Contributions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub emoji: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Contributions {
    pub commits: u64,
    pub repos: u64,
    pub prs: u64,
    pub issues: u64,
}

impl Status {
    /// Emoji and message joined by a space, `None` if both are missing.
    pub fn text(&self) -> Option<String> {
        let parts = [self.emoji.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<&str>>();
        match parts.is_empty() {
            true => None,
            false => Some(parts.join(" ")),
        }
    }
}

impl ProfileRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.handle)
    }
}

/// Body of the GraphQL request for `handle`.
pub fn user_query_body(handle: &str) -> serde_json::Value {
    serde_json::json!({
        "query": USER_QUERY,
        "variables": {
            "login": handle
        }
    })
}

// GitHub returns empty strings for unset profile fields.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decode a GraphQL response body into a profile.
pub fn parse_user_response(handle: &str, body: &str) -> BotResult<ProfileRecord> {
    // Response from the GitHub GraphQL API.
    // Defined here as it is only used by this function.
    #[derive(Debug, Deserialize)]
    struct GraphQLResponse {
        data: Option<UserData>,
        #[serde(default)]
        errors: Vec<GraphQLError>,
    }

    #[derive(Debug, Deserialize)]
    struct GraphQLError {
        message: String,
    }

    #[derive(Debug, Deserialize)]
    struct UserData {
        user: Option<User>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct User {
        login: String,
        name: Option<String>,
        #[serde(default)]
        avatar_url: String,
        #[serde(default)]
        url: String,
        bio: Option<String>,
        pronouns: Option<String>,
        status: Option<UserStatus>,
        #[serde(default)]
        contributions_collection: ContributionsCollection,
    }

    #[derive(Debug, Deserialize)]
    struct UserStatus {
        emoji: Option<String>,
        message: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    struct ContributionsCollection {
        total_commit_contributions: u64,
        total_repository_contributions: u64,
        pull_request_contributions: TotalCount,
        issue_contributions: TotalCount,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    struct TotalCount {
        total_count: u64,
    }

    let parsed = serde_json::from_str::<GraphQLResponse>(body)
        .map_err(|e| BotError::fetch(handle, format!("Could not decode response. {e}")))?;

    let user = match parsed.data.and_then(|d| d.user) {
        Some(user) => user,
        None => {
            let cause = match parsed.errors.first() {
                Some(error) => error.message.clone(),
                None => "Could not resolve to a User.".to_string(),
            };
            return Err(BotError::fetch(handle, cause));
        }
    };

    let status = user
        .status
        .map(|s| Status {
            emoji: non_empty(s.emoji),
            message: non_empty(s.message),
        })
        .filter(|s| s.text().is_some());

    let collection = user.contributions_collection;

    Ok(ProfileRecord {
        handle: user.login,
        name: non_empty(user.name),
        avatar_url: user.avatar_url,
        profile_url: user.url,
        bio: non_empty(user.bio),
        pronouns: non_empty(user.pronouns),
        status,
        contributions: Contributions {
            commits: collection.total_commit_contributions,
            repos: collection.total_repository_contributions,
            prs: collection.pull_request_contributions.total_count,
            issues: collection.issue_contributions.total_count,
        },
    })
}
