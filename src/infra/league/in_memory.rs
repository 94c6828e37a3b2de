// In-memory implementation of the league stores.
//
// Backs the service tests. DashMap keeps it safe to share across tasks.

use crate::core::league::{
    Challenge, ChallengeStore, GameType, LeagueError, Pilot, SeasonState, SettingsStore, Team,
    TeamStore,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

pub struct InMemoryLeagueStore {
    pilots: DashMap<u64, Pilot>,
    teams: DashMap<u64, Team>,
    challenges: DashMap<u64, Challenge>,
    /// game type -> map names in insertion order
    maps: DashMap<GameType, Vec<String>>,
    season: RwLock<SeasonState>,
    next_team_id: AtomicU64,
    next_challenge_id: AtomicU64,
}

impl InMemoryLeagueStore {
    pub fn new() -> Self {
        Self {
            pilots: DashMap::new(),
            teams: DashMap::new(),
            challenges: DashMap::new(),
            maps: DashMap::new(),
            season: RwLock::new(SeasonState::default()),
            next_team_id: AtomicU64::new(1),
            next_challenge_id: AtomicU64::new(1),
        }
    }

    fn sorted<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
    where
        F: Fn(&T) -> u64,
    {
        items.sort_by_key(|item| key(item));
        items
    }
}

impl Default for InMemoryLeagueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TeamStore for InMemoryLeagueStore {
    async fn get_pilot(&self, pilot_id: u64) -> Result<Option<Pilot>, LeagueError> {
        Ok(self.pilots.get(&pilot_id).map(|entry| entry.clone()))
    }

    async fn find_pilot_by_name(&self, name: &str) -> Result<Option<Pilot>, LeagueError> {
        let mut matches: Vec<Pilot> = self
            .pilots
            .iter()
            .filter(|entry| entry.name.eq_ignore_ascii_case(name.trim()))
            .map(|entry| entry.clone())
            .collect();
        if matches.len() > 1 {
            return Err(LeagueError::AmbiguousPilot(name.trim().to_string()));
        }
        Ok(matches.pop())
    }

    async fn save_pilot(&self, pilot: &Pilot) -> Result<(), LeagueError> {
        self.pilots.insert(pilot.id, pilot.clone());
        Ok(())
    }

    async fn insert_team(&self, mut team: Team) -> Result<Team, LeagueError> {
        team.id = self.next_team_id.fetch_add(1, Ordering::SeqCst);
        self.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn get_team(&self, team_id: u64) -> Result<Option<Team>, LeagueError> {
        Ok(self.teams.get(&team_id).map(|entry| entry.clone()))
    }

    async fn find_team(&self, name_or_tag: &str) -> Result<Option<Team>, LeagueError> {
        let query = name_or_tag.trim();
        let mut matches: Vec<Team> = self
            .teams
            .iter()
            .filter(|entry| {
                entry.name.eq_ignore_ascii_case(query) || entry.tag.eq_ignore_ascii_case(query)
            })
            .map(|entry| entry.clone())
            .collect();
        // Active teams first, then newest.
        matches.sort_by_key(|t| (t.disbanded, std::cmp::Reverse(t.id)));
        Ok(matches.into_iter().next())
    }

    async fn find_team_for_pilot(&self, pilot_id: u64) -> Result<Option<Team>, LeagueError> {
        Ok(self
            .teams
            .iter()
            .find(|entry| !entry.disbanded && entry.member(pilot_id).is_some())
            .map(|entry| entry.clone()))
    }

    async fn save_team(&self, team: &Team) -> Result<(), LeagueError> {
        self.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, LeagueError> {
        let teams = self.teams.iter().map(|entry| entry.clone()).collect();
        Ok(Self::sorted(teams, |t: &Team| t.id))
    }
}

#[async_trait]
impl ChallengeStore for InMemoryLeagueStore {
    async fn insert_challenge(&self, mut challenge: Challenge) -> Result<Challenge, LeagueError> {
        challenge.id = self.next_challenge_id.fetch_add(1, Ordering::SeqCst);
        self.challenges.insert(challenge.id, challenge.clone());
        Ok(challenge)
    }

    async fn get_challenge(&self, challenge_id: u64) -> Result<Option<Challenge>, LeagueError> {
        Ok(self.challenges.get(&challenge_id).map(|entry| entry.clone()))
    }

    async fn save_challenge(&self, challenge: &Challenge) -> Result<(), LeagueError> {
        self.challenges.insert(challenge.id, challenge.clone());
        Ok(())
    }

    async fn list_challenges_for_team(&self, team_id: u64) -> Result<Vec<Challenge>, LeagueError> {
        let challenges = self
            .challenges
            .iter()
            .filter(|entry| entry.involves(team_id))
            .map(|entry| entry.clone())
            .collect();
        Ok(Self::sorted(challenges, |c: &Challenge| c.id))
    }

    async fn list_challenges_for_season(
        &self,
        season: u32,
    ) -> Result<Vec<Challenge>, LeagueError> {
        let challenges = self
            .challenges
            .iter()
            .filter(|entry| entry.season == season)
            .map(|entry| entry.clone())
            .collect();
        Ok(Self::sorted(challenges, |c: &Challenge| c.id))
    }

    async fn list_open_challenges(&self) -> Result<Vec<Challenge>, LeagueError> {
        let challenges = self
            .challenges
            .iter()
            .filter(|entry| entry.is_open())
            .map(|entry| entry.clone())
            .collect();
        Ok(Self::sorted(challenges, |c: &Challenge| c.id))
    }
}

#[async_trait]
impl SettingsStore for InMemoryLeagueStore {
    async fn list_maps(&self, game_type: GameType) -> Result<Vec<String>, LeagueError> {
        Ok(self
            .maps
            .get(&game_type)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn add_map(&self, game_type: GameType, map: &str) -> Result<bool, LeagueError> {
        let mut pool = self.maps.entry(game_type).or_default();
        if pool.iter().any(|m| m.eq_ignore_ascii_case(map)) {
            return Ok(false);
        }
        pool.push(map.to_string());
        Ok(true)
    }

    async fn remove_map(&self, game_type: GameType, map: &str) -> Result<bool, LeagueError> {
        let mut pool = self.maps.entry(game_type).or_default();
        let before = pool.len();
        pool.retain(|m| !m.eq_ignore_ascii_case(map));
        Ok(pool.len() != before)
    }

    async fn get_season(&self) -> Result<SeasonState, LeagueError> {
        self.season
            .read()
            .map(|season| *season)
            .map_err(|e| LeagueError::Storage(e.to_string()))
    }

    async fn save_season(&self, season: &SeasonState) -> Result<(), LeagueError> {
        let mut current = self
            .season
            .write()
            .map_err(|e| LeagueError::Storage(e.to_string()))?;
        *current = *season;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn assigns_ids_and_finds_teams() {
        let store = InMemoryLeagueStore::new();
        let a = store
            .insert_team(Team::new("Alpha".into(), "ALP".into(), 1, Utc::now()))
            .await
            .unwrap();
        let b = store
            .insert_team(Team::new("Bravo".into(), "BRV".into(), 2, Utc::now()))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);

        let found = store.find_team("brv").await.unwrap().unwrap();
        assert_eq!(found.id, b.id);
        let found = store.find_team_for_pilot(1).await.unwrap().unwrap();
        assert_eq!(found.id, a.id);
        assert!(store.find_team_for_pilot(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn active_team_shadows_disbanded_namesake() {
        let store = InMemoryLeagueStore::new();
        let mut old = store
            .insert_team(Team::new("Alpha".into(), "ALP".into(), 1, Utc::now()))
            .await
            .unwrap();
        old.disbanded = true;
        store.save_team(&old).await.unwrap();
        let new = store
            .insert_team(Team::new("Alpha".into(), "ALP".into(), 2, Utc::now()))
            .await
            .unwrap();

        assert_eq!(store.find_team("alpha").await.unwrap().unwrap().id, new.id);
        assert!(store.find_team_for_pilot(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn map_pool_is_case_insensitive() {
        let store = InMemoryLeagueStore::new();
        assert!(store.add_map(GameType::TeamAnarchy, "Vault").await.unwrap());
        assert!(!store.add_map(GameType::TeamAnarchy, "vault").await.unwrap());
        assert!(store.list_maps(GameType::CaptureTheFlag).await.unwrap().is_empty());
        assert!(store.remove_map(GameType::TeamAnarchy, "VAULT").await.unwrap());
        assert!(store.list_maps(GameType::TeamAnarchy).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pilot_names_must_be_unique_to_resolve() {
        let store = InMemoryLeagueStore::new();
        for (id, name) in [(1, "Ace"), (2, "ace"), (3, "Nova")] {
            let pilot = Pilot {
                id,
                name: name.into(),
                timezone: None,
            };
            store.save_pilot(&pilot).await.unwrap();
        }

        assert_eq!(store.find_pilot_by_name(" nova ").await.unwrap().unwrap().id, 3);
        assert!(store.find_pilot_by_name("ghost").await.unwrap().is_none());
        assert_eq!(
            store.find_pilot_by_name("ACE").await,
            Err(LeagueError::AmbiguousPilot("ACE".to_string()))
        );
    }
}
