// HTTP client for the match tracker's game API.

use crate::core::challenges::{TeamColor, TrackerClient, TrackerGame, TrackerPlayer};
use crate::core::league::LeagueError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

impl From<reqwest::Error> for LeagueError {
    fn from(e: reqwest::Error) -> Self {
        LeagueError::Storage(e.to_string())
    }
}

pub struct HttpTrackerClient {
    client: Client,
    base_url: String,
}

impl HttpTrackerClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("User-Agent", HeaderValue::from_static("LeagueBot/0.1"));

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn map_team(value: &Value) -> Option<TeamColor> {
        match value {
            Value::String(s) if s.eq_ignore_ascii_case("blue") => Some(TeamColor::Blue),
            Value::String(s) if s.eq_ignore_ascii_case("orange") => Some(TeamColor::Orange),
            Value::Number(n) => match n.as_u64() {
                Some(0) => Some(TeamColor::Blue),
                Some(1) => Some(TeamColor::Orange),
                _ => None,
            },
            _ => None,
        }
    }

    fn map_game(api: ApiGame) -> Result<TrackerGame, LeagueError> {
        let players = api
            .players
            .into_iter()
            .map(|p| {
                let team = Self::map_team(&p.team).ok_or_else(|| {
                    LeagueError::Storage(format!(
                        "tracker game {} has player {} on unknown team {}",
                        api.id, p.name, p.team
                    ))
                })?;
                Ok(TrackerPlayer {
                    name: p.name,
                    team,
                    kills: p.kills,
                    assists: p.assists,
                    deaths: p.deaths,
                })
            })
            .collect::<Result<Vec<_>, LeagueError>>()?;
        Ok(TrackerGame {
            id: api.id,
            players,
        })
    }
}

#[async_trait]
impl TrackerClient for HttpTrackerClient {
    async fn fetch_game(&self, game_id: u64) -> Result<TrackerGame, LeagueError> {
        let url = format!("{}/game/{}", self.base_url, game_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(game_id, %status, "Tracker request failed");
            return Err(LeagueError::Storage(format!(
                "tracker returned {} for game {}",
                status, game_id
            )));
        }

        let api: ApiGame = response.json().await?;
        Self::map_game(api)
    }
}

#[derive(Debug, Deserialize)]
struct ApiGame {
    id: u64,
    #[serde(default)]
    players: Vec<ApiPlayer>,
}

#[derive(Debug, Deserialize)]
struct ApiPlayer {
    name: String,
    team: Value,
    #[serde(default)]
    kills: u32,
    #[serde(default)]
    assists: u32,
    #[serde(default)]
    deaths: u32,
}
