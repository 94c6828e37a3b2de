// SQLite implementation of the league stores.
//
// Teams and challenges are stored as JSON documents next to the handful of
// columns we query on. Aggregates are always written whole, so the indexed
// columns are refreshed on every save.

use crate::core::league::{
    Challenge, ChallengeStore, GameType, LeagueError, Pilot, SeasonState, SettingsStore, Team,
    TeamStore,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

impl From<sqlx::Error> for LeagueError {
    fn from(e: sqlx::Error) -> Self {
        LeagueError::Storage(e.to_string())
    }
}

pub struct SqliteLeagueStore {
    pool: SqlitePool,
}

impl SqliteLeagueStore {
    /// Open (creating if needed) the database at `database_path`.
    pub async fn new(database_path: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pilots (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL COLLATE NOCASE,
                timezone TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL COLLATE NOCASE,
                tag TEXT NOT NULL COLLATE NOCASE,
                disbanded INTEGER NOT NULL DEFAULT 0,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS challenges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                season INTEGER NOT NULL,
                challenging_team_id INTEGER NOT NULL,
                challenged_team_id INTEGER NOT NULL,
                open INTEGER NOT NULL DEFAULT 1,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_challenges_teams
            ON challenges(challenging_team_id, challenged_team_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS maps (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_type TEXT NOT NULL,
                name TEXT NOT NULL COLLATE NOCASE,
                UNIQUE (game_type, name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS season (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                number INTEGER NOT NULL,
                postseason INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn decode<T: DeserializeOwned>(row: &SqliteRow) -> Result<T, LeagueError> {
        let data: String = row.try_get("data")?;
        Ok(serde_json::from_str(&data)?)
    }

    fn decode_all<T: DeserializeOwned>(rows: &[SqliteRow]) -> Result<Vec<T>, LeagueError> {
        rows.iter().map(Self::decode).collect()
    }

    fn pilot_from_row(row: &SqliteRow) -> Result<Pilot, LeagueError> {
        Ok(Pilot {
            id: row.try_get::<i64, _>("id")? as u64,
            name: row.try_get("name")?,
            timezone: row.try_get("timezone")?,
        })
    }
}

// =============================================================================
// PILOTS AND TEAMS
// =============================================================================

#[async_trait]
impl TeamStore for SqliteLeagueStore {
    async fn get_pilot(&self, pilot_id: u64) -> Result<Option<Pilot>, LeagueError> {
        let row = sqlx::query("SELECT id, name, timezone FROM pilots WHERE id = ?")
            .bind(pilot_id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::pilot_from_row).transpose()
    }

    async fn find_pilot_by_name(&self, name: &str) -> Result<Option<Pilot>, LeagueError> {
        // Two rows are enough to tell a unique name from a shared one.
        let rows = sqlx::query("SELECT id, name, timezone FROM pilots WHERE name = ? LIMIT 2")
            .bind(name.trim())
            .fetch_all(&self.pool)
            .await?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Self::pilot_from_row(row).map(Some),
            _ => Err(LeagueError::AmbiguousPilot(name.trim().to_string())),
        }
    }

    async fn save_pilot(&self, pilot: &Pilot) -> Result<(), LeagueError> {
        sqlx::query(
            r#"
            INSERT INTO pilots (id, name, timezone) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, timezone = excluded.timezone
            "#,
        )
        .bind(pilot.id as i64)
        .bind(&pilot.name)
        .bind(&pilot.timezone)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_team(&self, mut team: Team) -> Result<Team, LeagueError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO teams (name, tag, disbanded, data) VALUES (?, ?, ?, '{}')",
        )
        .bind(&team.name)
        .bind(&team.tag)
        .bind(team.disbanded)
        .execute(&mut *tx)
        .await?;

        team.id = result.last_insert_rowid() as u64;
        sqlx::query("UPDATE teams SET data = ? WHERE id = ?")
            .bind(serde_json::to_string(&team)?)
            .bind(team.id as i64)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(team)
    }

    async fn get_team(&self, team_id: u64) -> Result<Option<Team>, LeagueError> {
        let row = sqlx::query("SELECT data FROM teams WHERE id = ?")
            .bind(team_id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn find_team(&self, name_or_tag: &str) -> Result<Option<Team>, LeagueError> {
        let query = name_or_tag.trim();
        let row = sqlx::query(
            r#"
            SELECT data FROM teams
            WHERE name = ? OR tag = ?
            ORDER BY disbanded ASC, id DESC
            LIMIT 1
            "#,
        )
        .bind(query)
        .bind(query)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn find_team_for_pilot(&self, pilot_id: u64) -> Result<Option<Team>, LeagueError> {
        let row = sqlx::query(
            r#"
            SELECT teams.data FROM teams, json_each(teams.data, '$.members') AS member
            WHERE teams.disbanded = 0
              AND json_extract(member.value, '$.pilot_id') = ?
            LIMIT 1
            "#,
        )
        .bind(pilot_id as i64)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn save_team(&self, team: &Team) -> Result<(), LeagueError> {
        sqlx::query("UPDATE teams SET name = ?, tag = ?, disbanded = ?, data = ? WHERE id = ?")
            .bind(&team.name)
            .bind(&team.tag)
            .bind(team.disbanded)
            .bind(serde_json::to_string(team)?)
            .bind(team.id as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, LeagueError> {
        let rows = sqlx::query("SELECT data FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Self::decode_all(&rows)
    }
}

// =============================================================================
// CHALLENGES
// =============================================================================

#[async_trait]
impl ChallengeStore for SqliteLeagueStore {
    async fn insert_challenge(&self, mut challenge: Challenge) -> Result<Challenge, LeagueError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO challenges (season, challenging_team_id, challenged_team_id, open, data)
            VALUES (?, ?, ?, ?, '{}')
            "#,
        )
        .bind(challenge.season as i64)
        .bind(challenge.challenging_team as i64)
        .bind(challenge.challenged_team as i64)
        .bind(challenge.is_open())
        .execute(&mut *tx)
        .await?;

        challenge.id = result.last_insert_rowid() as u64;
        sqlx::query("UPDATE challenges SET data = ? WHERE id = ?")
            .bind(serde_json::to_string(&challenge)?)
            .bind(challenge.id as i64)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(challenge)
    }

    async fn get_challenge(&self, challenge_id: u64) -> Result<Option<Challenge>, LeagueError> {
        let row = sqlx::query("SELECT data FROM challenges WHERE id = ?")
            .bind(challenge_id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn save_challenge(&self, challenge: &Challenge) -> Result<(), LeagueError> {
        sqlx::query("UPDATE challenges SET open = ?, data = ? WHERE id = ?")
            .bind(challenge.is_open())
            .bind(serde_json::to_string(challenge)?)
            .bind(challenge.id as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_challenges_for_team(&self, team_id: u64) -> Result<Vec<Challenge>, LeagueError> {
        let rows = sqlx::query(
            r#"
            SELECT data FROM challenges
            WHERE challenging_team_id = ? OR challenged_team_id = ?
            ORDER BY id
            "#,
        )
        .bind(team_id as i64)
        .bind(team_id as i64)
        .fetch_all(&self.pool)
        .await?;
        Self::decode_all(&rows)
    }

    async fn list_challenges_for_season(
        &self,
        season: u32,
    ) -> Result<Vec<Challenge>, LeagueError> {
        let rows = sqlx::query("SELECT data FROM challenges WHERE season = ? ORDER BY id")
            .bind(season as i64)
            .fetch_all(&self.pool)
            .await?;
        Self::decode_all(&rows)
    }

    async fn list_open_challenges(&self) -> Result<Vec<Challenge>, LeagueError> {
        let rows = sqlx::query("SELECT data FROM challenges WHERE open = 1 ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Self::decode_all(&rows)
    }
}

// =============================================================================
// SEASON AND MAP POOL
// =============================================================================

#[async_trait]
impl SettingsStore for SqliteLeagueStore {
    async fn list_maps(&self, game_type: GameType) -> Result<Vec<String>, LeagueError> {
        let rows = sqlx::query("SELECT name FROM maps WHERE game_type = ? ORDER BY id")
            .bind(game_type.code())
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(LeagueError::from))
            .collect()
    }

    async fn add_map(&self, game_type: GameType, map: &str) -> Result<bool, LeagueError> {
        let result = sqlx::query("INSERT OR IGNORE INTO maps (game_type, name) VALUES (?, ?)")
            .bind(game_type.code())
            .bind(map)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_map(&self, game_type: GameType, map: &str) -> Result<bool, LeagueError> {
        let result = sqlx::query("DELETE FROM maps WHERE game_type = ? AND name = ?")
            .bind(game_type.code())
            .bind(map)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_season(&self) -> Result<SeasonState, LeagueError> {
        let row = sqlx::query("SELECT number, postseason FROM season WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(SeasonState {
                number: row.try_get::<i64, _>("number")? as u32,
                postseason: row.try_get("postseason")?,
            }),
            None => Ok(SeasonState::default()),
        }
    }

    async fn save_season(&self, season: &SeasonState) -> Result<(), LeagueError> {
        sqlx::query(
            r#"
            INSERT INTO season (id, number, postseason) VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET number = excluded.number, postseason = excluded.postseason
            "#,
        )
        .bind(season.number as i64)
        .bind(season.postseason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
