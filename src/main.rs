// Entry point of the league bot.
//
// **Architecture Overview:**
// - `core/` = League rules and services (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite, tracker and cloud APIs)
// - `discord/` = Discord-specific adapters (commands, replies, announcements)
//
// This file loads configuration, wires the services together, sets up the
// poise framework and starts the background loops.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::challenges::{ChallengeService, TrackerClient};
use crate::core::league::LeagueConfig;
use crate::core::season::SeasonService;
use crate::core::servers::{CloudControl, ServerService};
use crate::core::standings::StandingsService;
use crate::core::teams::TeamService;
use crate::discord::announcements::{self, ClockNotices};
use crate::discord::command_gate::CommandGate;
use crate::discord::commands::presence;
use crate::discord::{Data, Error};
use crate::infra::league::SqliteLeagueStore;
use crate::infra::servers::HttpCloudControl;
use crate::infra::tracker::HttpTrackerClient;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration as StdDuration;

const CLOCK_CHECK_INTERVAL: StdDuration = StdDuration::from_secs(60 * 60);
const IDLE_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env().expect("Invalid bot configuration");

    // Keep the database in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let store = Arc::new(
        SqliteLeagueStore::new(&config.database_path())
            .await
            .expect("Failed to initialize SQLite store"),
    );
    let league_config = LeagueConfig::from_env();
    tracing::info!(?league_config, "League rules loaded");

    let teams = Arc::new(TeamService::new(Arc::clone(&store), league_config.clone()));
    let challenges = Arc::new(ChallengeService::new(Arc::clone(&store), league_config));
    let season = Arc::new(SeasonService::new(Arc::clone(&store)));
    let standings = Arc::new(StandingsService::new(Arc::clone(&store)));

    let tracker: Arc<dyn TrackerClient> = Arc::new(
        HttpTrackerClient::new(&config.tracker_url).expect("Failed to create tracker client"),
    );

    let servers = match &config.cloud_control {
        Some(cloud) => {
            let control: Arc<dyn CloudControl> = Arc::new(
                HttpCloudControl::new(&cloud.url, &cloud.token)
                    .expect("Failed to create cloud control client"),
            );
            let idle = chrono::Duration::minutes(config.server_idle_minutes);
            tracing::info!(servers = ?config.game_servers, "Game server control enabled");
            Some(Arc::new(ServerService::new(control, &config.game_servers, idle)))
        }
        None => {
            tracing::info!("CLOUD_CONTROL_URL not set, server commands are disabled");
            None
        }
    };

    let data = Data {
        teams,
        challenges,
        season,
        standings,
        servers,
        tracker,
        gate: CommandGate::new(),
        announce_channel: config.announce_channel_id,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    // Slash commands only, so no privileged intents.
    let intents = serenity::GatewayIntents::GUILDS;
    let dev_guild_id = config.dev_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            on_error: |error| Box::pin(discord::error_handler::on_error(error)),
            pre_command: |ctx| {
                Box::pin(async move {
                    tracing::debug!(
                        command = %ctx.command().qualified_name,
                        user_id = ctx.author().id.get(),
                        "Running command"
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("🤖 Bot is starting up...");

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                if let Some(guild_id) = dev_guild_id {
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        serenity::GuildId::new(guild_id),
                    )
                    .await?;
                    tracing::info!(guild_id, "Commands registered in the dev guild");
                }

                tracing::info!("✅ Commands registered!");
                presence::on_ready(ctx, &data).await;

                // Hourly check for clocks whose deadline passed unscheduled.
                let challenges = Arc::clone(&data.challenges);
                let teams = Arc::clone(&data.teams);
                let channel = data.announce_channel;
                let http = ctx.http.clone();
                tokio::spawn(async move {
                    let mut notices = ClockNotices::new();
                    loop {
                        tracing::debug!("Checking for expired clocks");
                        announcements::announce_expired_clocks(
                            &http,
                            channel,
                            &challenges,
                            &teams,
                            &mut notices,
                        )
                        .await;
                        tokio::time::sleep(CLOCK_CHECK_INTERVAL).await;
                    }
                });

                // Stop game servers nobody has used for the idle timeout.
                if let Some(servers) = data.servers.clone() {
                    let channel = data.announce_channel;
                    let http = ctx.http.clone();
                    tokio::spawn(async move {
                        loop {
                            tokio::time::sleep(IDLE_SWEEP_INTERVAL).await;
                            tracing::debug!("Sweeping idle game servers");
                            let stopped = servers.sweep_idle(chrono::Utc::now()).await;
                            announcements::announce_stopped_servers(&http, channel, &stopped)
                                .await;
                        }
                    });
                }

                tracing::info!("🚀 Bot is ready!");
                Ok::<Data, Error>(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
