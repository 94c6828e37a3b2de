// HTTP client for the cloud server control endpoint.
//
// The endpoint fronts the actual cloud provider; we only ask it to start,
// stop, or describe a named server.

use crate::core::league::LeagueError;
use crate::core::servers::{CloudControl, ServerPower};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;

pub struct HttpCloudControl {
    client: Client,
    base_url: String,
}

impl HttpCloudControl {
    pub fn new(base_url: &str, token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn map_power(state: &str) -> ServerPower {
        match state.trim().to_lowercase().as_str() {
            "running" | "started" | "on" => ServerPower::Running,
            "stopped" | "deallocated" | "off" => ServerPower::Stopped,
            _ => ServerPower::Unknown,
        }
    }

    async fn post(&self, server: &str, action: &str) -> Result<(), LeagueError> {
        let url = format!("{}/servers/{}/{}", self.base_url, server, action);
        let response = self.client.post(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LeagueError::Storage(format!(
                "cloud control {} {} failed: {} - {}",
                action, server, status, text
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiServerStatus {
    #[serde(alias = "power", alias = "status")]
    state: String,
}

#[async_trait]
impl CloudControl for HttpCloudControl {
    async fn start(&self, server: &str) -> Result<(), LeagueError> {
        self.post(server, "start").await
    }

    async fn stop(&self, server: &str) -> Result<(), LeagueError> {
        self.post(server, "stop").await
    }

    async fn status(&self, server: &str) -> Result<ServerPower, LeagueError> {
        let url = format!("{}/servers/{}", self.base_url, server);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LeagueError::Storage(format!(
                "cloud control status {} failed: {}",
                server,
                response.status()
            )));
        }
        let status: ApiServerStatus = response.json().await?;
        Ok(Self::map_power(&status.state))
    }
}
