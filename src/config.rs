// Process configuration read from the environment (and `.env`).

use anyhow::Context as _;
use std::env;

const DEFAULT_TRACKER_URL: &str = "https://tracker.otl.gg/api";
const DEFAULT_IDLE_MINUTES: i64 = 15;

#[derive(Debug, Clone)]
pub struct CloudControlConfig {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub data_dir: String,
    /// Commands are also registered here so changes show up immediately.
    pub dev_guild_id: Option<u64>,
    pub announce_channel_id: Option<u64>,
    pub tracker_url: String,
    /// Server commands are disabled without it.
    pub cloud_control: Option<CloudControlConfig>,
    pub game_servers: Vec<String>,
    pub server_idle_minutes: i64,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN").context(
            "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
        )?;

        let cloud_control = match (env::var("CLOUD_CONTROL_URL"), env::var("CLOUD_CONTROL_TOKEN")) {
            (Ok(url), Ok(token)) if !url.trim().is_empty() => Some(CloudControlConfig {
                url: url.trim().to_string(),
                token: token.trim().to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            discord_token,
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            dev_guild_id: parse_optional("DEV_GUILD_ID")?,
            announce_channel_id: parse_optional("ANNOUNCE_CHANNEL_ID")?,
            tracker_url: env::var("TRACKER_URL").unwrap_or_else(|_| DEFAULT_TRACKER_URL.to_string()),
            cloud_control,
            game_servers: parse_list(&env::var("GAME_SERVERS").unwrap_or_default()),
            server_idle_minutes: parse_optional("SERVER_IDLE_MINUTES")?
                .unwrap_or(DEFAULT_IDLE_MINUTES),
        })
    }

    pub fn database_path(&self) -> String {
        format!("{}/league.db", self.data_dir)
    }
}

fn parse_optional<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{} must be a number, got `{}`", key, raw)),
        _ => Ok(None),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
