// Storage ports for the league.
//
// The core defines WHAT it needs; `infra/league` provides the DashMap
// (tests) and SQLite (production) implementations. Aggregates are loaded and
// saved whole: a team carries its roster, invites and home maps, a challenge
// carries its suggestions, report and box score.

use super::league_models::{Challenge, GameType, Pilot, SeasonState, Team};
use super::LeagueError;
use async_trait::async_trait;

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn get_pilot(&self, pilot_id: u64) -> Result<Option<Pilot>, LeagueError>;

    /// Case-insensitive lookup by display name. A name shared by more than
    /// one pilot is `AmbiguousPilot`.
    async fn find_pilot_by_name(&self, name: &str) -> Result<Option<Pilot>, LeagueError>;

    async fn save_pilot(&self, pilot: &Pilot) -> Result<(), LeagueError>;

    /// Persist a new team and return it with its assigned id.
    async fn insert_team(&self, team: Team) -> Result<Team, LeagueError>;

    async fn get_team(&self, team_id: u64) -> Result<Option<Team>, LeagueError>;

    /// Case-insensitive lookup by name or tag. Active teams win over
    /// disbanded ones with the same name.
    async fn find_team(&self, name_or_tag: &str) -> Result<Option<Team>, LeagueError>;

    /// The active team `pilot_id` is a member of.
    async fn find_team_for_pilot(&self, pilot_id: u64) -> Result<Option<Team>, LeagueError>;

    async fn save_team(&self, team: &Team) -> Result<(), LeagueError>;

    /// Every team, disbanded ones included.
    async fn list_teams(&self) -> Result<Vec<Team>, LeagueError>;
}

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Persist a new challenge and return it with its assigned id.
    async fn insert_challenge(&self, challenge: Challenge) -> Result<Challenge, LeagueError>;

    async fn get_challenge(&self, challenge_id: u64) -> Result<Option<Challenge>, LeagueError>;

    async fn save_challenge(&self, challenge: &Challenge) -> Result<(), LeagueError>;

    /// All challenges involving the team, oldest first.
    async fn list_challenges_for_team(&self, team_id: u64) -> Result<Vec<Challenge>, LeagueError>;

    /// All challenges of a season, oldest first.
    async fn list_challenges_for_season(&self, season: u32)
        -> Result<Vec<Challenge>, LeagueError>;

    /// Every challenge that is neither voided nor confirmed.
    async fn list_open_challenges(&self) -> Result<Vec<Challenge>, LeagueError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn list_maps(&self, game_type: GameType) -> Result<Vec<String>, LeagueError>;

    /// Returns false if the map was already in the pool.
    async fn add_map(&self, game_type: GameType, map: &str) -> Result<bool, LeagueError>;

    /// Returns false if the map was not in the pool.
    async fn remove_map(&self, game_type: GameType, map: &str) -> Result<bool, LeagueError>;

    async fn get_season(&self) -> Result<SeasonState, LeagueError>;

    async fn save_season(&self, season: &SeasonState) -> Result<(), LeagueError>;
}

/// Everything the league services need from one backing store.
pub trait LeagueStore: TeamStore + ChallengeStore + SettingsStore {}

impl<T: TeamStore + ChallengeStore + SettingsStore> LeagueStore for T {}
