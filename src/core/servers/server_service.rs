// Cloud game servers.
//
// Servers are started on demand by pilots and stopped again once nobody has
// touched them for the idle timeout. The cloud provider sits behind the
// `CloudControl` port; this module only tracks power state and activity.

use crate::core::league::LeagueError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPower {
    Running,
    Stopped,
    /// The control endpoint reported something we don't model.
    Unknown,
}

impl fmt::Display for ServerPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerPower::Running => write!(f, "Running"),
            ServerPower::Stopped => write!(f, "Stopped"),
            ServerPower::Unknown => write!(f, "Unknown"),
        }
    }
}

#[async_trait]
pub trait CloudControl: Send + Sync {
    async fn start(&self, server: &str) -> Result<(), LeagueError>;
    async fn stop(&self, server: &str) -> Result<(), LeagueError>;
    async fn status(&self, server: &str) -> Result<ServerPower, LeagueError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerActivity {
    pub power: ServerPower,
    pub last_activity: Option<DateTime<Utc>>,
    pub started_by: Option<u64>,
}

impl ServerActivity {
    fn stopped() -> Self {
        Self {
            power: ServerPower::Stopped,
            last_activity: None,
            started_by: None,
        }
    }
}

pub struct ServerService {
    control: Arc<dyn CloudControl>,
    servers: DashMap<String, ServerActivity>,
    idle_timeout: Duration,
}

impl ServerService {
    pub fn new(control: Arc<dyn CloudControl>, names: &[String], idle_timeout: Duration) -> Self {
        let servers = DashMap::new();
        for name in names {
            servers.insert(name.to_lowercase(), ServerActivity::stopped());
        }
        Self {
            control,
            servers,
            idle_timeout,
        }
    }

    fn known(&self, name: &str) -> Result<String, LeagueError> {
        let key = name.trim().to_lowercase();
        if self.servers.contains_key(&key) {
            Ok(key)
        } else {
            Err(LeagueError::UnknownServer(name.trim().to_string()))
        }
    }

    fn power_of(&self, key: &str) -> ServerPower {
        self.servers
            .get(key)
            .map(|entry| entry.power)
            .unwrap_or(ServerPower::Unknown)
    }

    pub async fn start(&self, name: &str, pilot_id: u64) -> Result<ServerActivity, LeagueError> {
        let key = self.known(name)?;
        if self.power_of(&key) == ServerPower::Running {
            return Err(LeagueError::ServerRunning(key));
        }

        self.control.start(&key).await?;

        let activity = ServerActivity {
            power: ServerPower::Running,
            last_activity: Some(Utc::now()),
            started_by: Some(pilot_id),
        };
        self.servers.insert(key.clone(), activity.clone());
        tracing::info!(server = %key, pilot_id, "Game server started");
        Ok(activity)
    }

    pub async fn stop(&self, name: &str) -> Result<(), LeagueError> {
        let key = self.known(name)?;
        if self.power_of(&key) != ServerPower::Running {
            return Err(LeagueError::ServerNotRunning(key));
        }

        self.control.stop(&key).await?;
        self.servers.insert(key.clone(), ServerActivity::stopped());
        tracing::info!(server = %key, "Game server stopped");
        Ok(())
    }

    /// Push back the idle shutdown of a running server.
    pub fn keep_alive(&self, name: &str) -> Result<DateTime<Utc>, LeagueError> {
        let key = self.known(name)?;
        let mut entry = self
            .servers
            .get_mut(&key)
            .ok_or_else(|| LeagueError::UnknownServer(key.clone()))?;
        if entry.power != ServerPower::Running {
            return Err(LeagueError::ServerNotRunning(key));
        }
        let now = Utc::now();
        entry.last_activity = Some(now);
        Ok(now + self.idle_timeout)
    }

    /// Ask the control endpoint for the real power state.
    pub async fn refresh(&self, name: &str) -> Result<ServerActivity, LeagueError> {
        let key = self.known(name)?;
        let power = self.control.status(&key).await?;

        let mut entry = self
            .servers
            .entry(key)
            .or_insert_with(ServerActivity::stopped);
        if power == ServerPower::Running && entry.power != ServerPower::Running {
            // Started outside the bot; give it a full idle window.
            entry.last_activity = Some(Utc::now());
        }
        if power != ServerPower::Running {
            entry.last_activity = None;
            entry.started_by = None;
        }
        entry.power = power;
        Ok(entry.clone())
    }

    /// Every configured server, sorted by name.
    pub fn statuses(&self) -> Vec<(String, ServerActivity)> {
        let mut statuses: Vec<(String, ServerActivity)> = self
            .servers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Stop running servers idle past the timeout. Returns the names stopped.
    pub async fn sweep_idle(&self, now: DateTime<Utc>) -> Vec<String> {
        let idle: Vec<String> = self
            .servers
            .iter()
            .filter(|entry| entry.power == ServerPower::Running)
            .filter(|entry| {
                entry
                    .last_activity
                    .map_or(true, |last| now - last > self.idle_timeout)
            })
            .map(|entry| entry.key().clone())
            .collect();

        let mut stopped = Vec::with_capacity(idle.len());
        for name in idle {
            match self.control.stop(&name).await {
                Ok(()) => {
                    self.servers.insert(name.clone(), ServerActivity::stopped());
                    tracing::info!(server = %name, "Stopped idle game server");
                    stopped.push(name);
                }
                Err(e) => {
                    tracing::warn!(server = %name, error = %e, "Failed to stop idle game server");
                }
            }
        }
        stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeControl {
        calls: Mutex<Vec<String>>,
        fail_stop: bool,
        reported: Option<ServerPower>,
    }

    #[async_trait]
    impl CloudControl for FakeControl {
        async fn start(&self, server: &str) -> Result<(), LeagueError> {
            self.calls.lock().unwrap().push(format!("start {}", server));
            Ok(())
        }

        async fn stop(&self, server: &str) -> Result<(), LeagueError> {
            self.calls.lock().unwrap().push(format!("stop {}", server));
            if self.fail_stop {
                return Err(LeagueError::Storage("control unavailable".into()));
            }
            Ok(())
        }

        async fn status(&self, _server: &str) -> Result<ServerPower, LeagueError> {
            Ok(self.reported.unwrap_or(ServerPower::Stopped))
        }
    }

    fn service(control: FakeControl) -> (Arc<FakeControl>, ServerService) {
        let control = Arc::new(control);
        let names = vec!["Chicago".to_string(), "Frankfurt".to_string()];
        let service = ServerService::new(control.clone(), &names, Duration::minutes(15));
        (control, service)
    }

    #[tokio::test]
    async fn start_and_stop() {
        let (control, servers) = service(FakeControl::default());
        let activity = servers.start("chicago", 42).await.unwrap();
        assert_eq!(activity.power, ServerPower::Running);
        assert_eq!(activity.started_by, Some(42));

        assert_eq!(
            servers.start("Chicago", 42).await.unwrap_err(),
            LeagueError::ServerRunning("chicago".into())
        );
        assert_eq!(
            servers.start("Tokyo", 42).await.unwrap_err(),
            LeagueError::UnknownServer("Tokyo".into())
        );

        servers.stop("chicago").await.unwrap();
        assert_eq!(
            servers.stop("chicago").await.unwrap_err(),
            LeagueError::ServerNotRunning("chicago".into())
        );
        assert_eq!(
            *control.calls.lock().unwrap(),
            vec!["start chicago".to_string(), "stop chicago".to_string()]
        );
    }

    #[tokio::test]
    async fn keep_alive_requires_running_server() {
        let (_, servers) = service(FakeControl::default());
        assert!(servers.keep_alive("frankfurt").is_err());
        servers.start("frankfurt", 1).await.unwrap();
        let until = servers.keep_alive("frankfurt").unwrap();
        assert!(until > Utc::now() + Duration::minutes(14));
    }

    #[tokio::test]
    async fn sweep_stops_only_idle_servers() {
        let (_, servers) = service(FakeControl::default());
        servers.start("chicago", 1).await.unwrap();
        servers.start("frankfurt", 1).await.unwrap();

        assert!(servers.sweep_idle(Utc::now()).await.is_empty());

        let later = Utc::now() + Duration::minutes(20);
        let mut stopped = servers.sweep_idle(later).await;
        stopped.sort();
        assert_eq!(stopped, vec!["chicago", "frankfurt"]);
        assert!(servers
            .statuses()
            .iter()
            .all(|(_, activity)| activity.power == ServerPower::Stopped));
    }

    #[tokio::test]
    async fn sweep_skips_failed_stops() {
        let (_, servers) = service(FakeControl {
            fail_stop: true,
            ..Default::default()
        });
        servers.start("chicago", 1).await.unwrap();
        let stopped = servers
            .sweep_idle(Utc::now() + Duration::hours(1))
            .await;
        assert!(stopped.is_empty());
        assert_eq!(servers.statuses()[0].1.power, ServerPower::Running);
    }

    #[tokio::test]
    async fn refresh_adopts_external_state() {
        let (_, servers) = service(FakeControl {
            reported: Some(ServerPower::Running),
            ..Default::default()
        });
        let activity = servers.refresh("frankfurt").await.unwrap();
        assert_eq!(activity.power, ServerPower::Running);
        assert!(activity.last_activity.is_some());
        assert!(activity.started_by.is_none());
    }
}
