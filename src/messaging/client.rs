use crate::core::{commands::Command, handler::CommandHandler, handler::Reply};
use crate::error::{BotError, BotResult};
use crate::github::client::GitHub;
use http::StatusCode;
use slack_morphism::{
    api::SlackApiChatPostMessageRequest,
    events::{SlackEventCallbackBody, SlackPushEventCallback},
    hyper_tokio::{SlackClientHyperConnector, SlackHyperClient},
    listener::{SlackClientEventsListenerEnvironment, SlackClientEventsUserState},
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackClient, SlackClientSocketModeConfig,
    SlackClientSocketModeListener, SlackMessageContent, SlackSocketModeListenerCallbacks, SlackTs,
};
use std::sync::Arc;
use tracing::{error, info};

/// Everything the event callbacks need, stored in the listener user state.
#[derive(Clone)]
pub struct BotState {
    pub handler: Arc<CommandHandler<GitHub>>,
    pub bot_token: SlackApiToken,
}

impl BotState {
    pub fn new(handler: CommandHandler<GitHub>, bot_token: String) -> Self {
        let bot_token_value: SlackApiTokenValue = bot_token.into();
        BotState {
            handler: Arc::new(handler),
            bot_token: SlackApiToken::new(bot_token_value),
        }
    }
}

async fn push_events_socket_mode_function(
    event: SlackPushEventCallback,
    client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Only watch Message events. To be switched to match cases if we want other behaviors
    // on other event types.
    if let SlackEventCallbackBody::Message(message) = event.event {
        if message.sender.bot_id.is_some() {
            // Abort if message from bot
            return Ok(());
        }

        if let (Some(content), Some(channel_id)) = (message.content, message.origin.channel) {
            if let Some(text) = content.text {
                if !Command::is_command(&text) {
                    return Ok(());
                }

                // Scoped so the state lock is released before handling the command
                let state = {
                    let states = states.read().await;
                    states.get_user_state::<BotState>().cloned()
                };
                let state = state.ok_or_else(|| {
                    BotError::Slack("Bot state missing from listener environment".to_string())
                })?;

                // The Slack workspace is the group tracking its own users.
                let group = event.team_id.0;
                info!("Received command in channel id {channel_id} of team {group}");

                let thread_ts = message.origin.ts;
                let command = match Command::build_from(&text) {
                    Ok(command) => command,
                    Err(e) => {
                        let reply = Reply::from(e);
                        post_reply(&client, &state, channel_id, thread_ts, reply).await?;
                        return Ok(());
                    }
                };

                // Fetching profiles can outlast the Socket Mode ack deadline, so the
                // command runs in its own task and the event is acknowledged right away.
                tokio::spawn(async move {
                    let reply = state.handler.execute(&group, command).await;
                    if let Err(e) =
                        post_reply(&client, &state, channel_id, thread_ts, reply).await
                    {
                        error!("Could not post reply for team {group}. {e}");
                    }
                });
            }
        }
    }
    Ok(())
}

async fn post_reply(
    client: &SlackHyperClient,
    state: &BotState,
    channel_id: SlackChannelId,
    thread_ts: SlackTs,
    reply: Reply,
) -> BotResult<()> {
    let session = client.open_session(&state.bot_token);
    let request = SlackApiChatPostMessageRequest::new(
        channel_id,
        SlackMessageContent::new().with_text(reply.to_string()),
    )
    .with_thread_ts(thread_ts);
    session
        .chat_post_message(&request)
        .await
        .map_err(|e| BotError::Slack(e.to_string()))?;
    Ok(())
}

fn error_handler(
    err: Box<dyn std::error::Error + Send + Sync>,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> StatusCode {
    let error = BotError::Slack(err.to_string());
    error!("{error}");

    // This return value should be OK if we want to return successful ack to the Slack server using Web-sockets
    // https://api.slack.com/apis/connections/socket-implement#acknowledge
    // so that Slack knows whether to retry
    StatusCode::OK
}

/// Listen to Slack messages in Socket Mode and answer the bot commands.
/// Returns when the listener stops.
pub async fn initialize_messaging(state: BotState, app_token: String) -> BotResult<()> {
    let client = Arc::new(SlackClient::new(SlackClientHyperConnector::new()));

    let socket_mode_callbacks =
        SlackSocketModeListenerCallbacks::new().with_push_events(push_events_socket_mode_function);

    let listener_environment = Arc::new(
        SlackClientEventsListenerEnvironment::new(client.clone())
            .with_error_handler(error_handler)
            .with_user_state(state),
    );

    let socket_mode_listener = SlackClientSocketModeListener::new(
        &SlackClientSocketModeConfig::new(),
        listener_environment.clone(),
        socket_mode_callbacks,
    );

    let app_token_value: SlackApiTokenValue = app_token.into();
    let app_token: SlackApiToken = SlackApiToken::new(app_token_value);

    socket_mode_listener
        .listen_for(&app_token)
        .await
        .map_err(|e| BotError::Slack(e.to_string()))?;

    info!("Listening to Slack events.");
    socket_mode_listener.serve().await;

    Ok(())
}
