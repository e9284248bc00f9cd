use hubrank::config::Settings;
use hubrank::core::handler::{CommandHandler, HandlerOptions};
use hubrank::github::client::GitHub;
use hubrank::messaging::client::{initialize_messaging, BotState};
use hubrank::storage::Database;

use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::new()?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    // Opened once, shared by every command until the process stops.
    let db = Arc::new(Database::open(Path::new(&settings.database_path))?);

    let github = GitHub::new(
        settings.github_api_url.clone(),
        settings.github_api_timeout(),
        settings.github_token.clone(),
    )?;

    let handler = CommandHandler::new(
        db,
        github,
        HandlerOptions {
            freshness_window: settings.freshness_window(),
            refresh_stale: !settings.cache_only,
            profile_url: settings.github_profile_url.clone(),
        },
    );

    info!("Initializing messaging engine.");
    let state = BotState::new(handler, settings.slack_token.clone());
    initialize_messaging(state, settings.slack_app_token.clone()).await?;

    Ok(())
}
