// Season state and the map pool.

use crate::core::league::validation::normalize_map_name;
use crate::core::league::{GameType, LeagueError, LeagueStore, SeasonState};
use std::sync::Arc;

pub struct SeasonService<S: LeagueStore> {
    store: Arc<S>,
}

impl<S: LeagueStore> SeasonService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn current(&self) -> Result<SeasonState, LeagueError> {
        self.store.get_season().await
    }

    pub async fn start_postseason(&self) -> Result<SeasonState, LeagueError> {
        self.set_postseason(true).await
    }

    pub async fn end_postseason(&self) -> Result<SeasonState, LeagueError> {
        self.set_postseason(false).await
    }

    async fn set_postseason(&self, postseason: bool) -> Result<SeasonState, LeagueError> {
        let mut season = self.store.get_season().await?;
        season.postseason = postseason;
        self.store.save_season(&season).await?;
        tracing::info!(season = season.number, postseason, "Postseason toggled");
        Ok(season)
    }

    pub async fn start_new_season(&self) -> Result<SeasonState, LeagueError> {
        let previous = self.store.get_season().await?;
        let season = SeasonState {
            number: previous.number + 1,
            postseason: false,
        };
        self.store.save_season(&season).await?;
        tracing::info!(season = season.number, "New season started");
        Ok(season)
    }

    // ------------------------------------------------------------------
    // Map pool
    // ------------------------------------------------------------------

    pub async fn maps(&self, game_type: GameType) -> Result<Vec<String>, LeagueError> {
        self.store.list_maps(game_type).await
    }

    pub async fn add_map(&self, game_type: GameType, map: &str) -> Result<String, LeagueError> {
        let map = normalize_map_name(map);
        if map.is_empty() {
            return Err(LeagueError::EmptyMapName);
        }
        if !self.store.add_map(game_type, &map).await? {
            return Err(LeagueError::MapAlreadyInPool(map));
        }
        tracing::info!(game_type = game_type.code(), map = %map, "Map added to pool");
        Ok(map)
    }

    pub async fn remove_map(&self, game_type: GameType, map: &str) -> Result<(), LeagueError> {
        let map = normalize_map_name(map);
        if !self.store.remove_map(game_type, &map).await? {
            return Err(LeagueError::MapNotInPool { map, game_type });
        }
        tracing::info!(game_type = game_type.code(), map = %map, "Map removed from pool");
        Ok(())
    }
}
