use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::error::{BotError, BotResult};
use crate::github::profile::{parse_user_response, user_query_body, ProfileRecord};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Source of profile data. The bot talks to GitHub, tests plug in their own.
#[allow(async_fn_in_trait)]
pub trait ProfileProvider {
    async fn fetch_profile(&self, handle: &str) -> BotResult<ProfileRecord>;
}

pub struct GitHub {
    http_client: Client,
    api_url: String,
    token: String,
}

impl GitHub {
    pub fn new(api_url: String, timeout: Duration, token: String) -> BotResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http_client,
            api_url,
            token,
        })
    }

    async fn post_user_query(&self, handle: &str) -> BotResult<String> {
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&user_query_body(handle))
            .send()
            .await
            .map_err(|e| match e.is_timeout() {
                true => BotError::fetch(handle, "The GitHub API did not answer in time."),
                false => BotError::fetch(handle, e),
            })?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| BotError::fetch(handle, e)),
            // GitHub responds with UNAUTHORIZED when the token is invalid or expired.
            StatusCode::UNAUTHORIZED => Err(BotError::fetch(
                handle,
                format!("{}. The GitHub token might have expired.", StatusCode::UNAUTHORIZED),
            )),
            status => Err(BotError::fetch(handle, status)),
        }
    }
}

impl ProfileProvider for GitHub {
    async fn fetch_profile(&self, handle: &str) -> BotResult<ProfileRecord> {
        if handle.trim().is_empty() {
            return Err(BotError::fetch(handle, "Empty handle."));
        }

        debug!("Querying GitHub profile of {handle}");
        let body = self.post_user_query(handle).await?;
        let profile = parse_user_response(handle, &body)?;
        Ok(profile)
    }
}
