// The challenge state machine.
//
// A challenge moves Unscheduled -> TimeSuggested -> Scheduled -> Reported ->
// Confirmed, can be voided at any point, and a confirmed tie can spawn a
// rematch. Along the way the two teams agree on a team size, a map (picked
// from the home team's set or a confirmed neutral map) and a match time.
// Every operation loads the challenge, runs the validation chain and saves
// the result.

use super::box_score::{build_stat_lines, ResolvedPlayer, TeamColor, TrackerClient};
use crate::core::league::validation as check;
use crate::core::league::{
    parse_match_time, AuthorizedPilot, Challenge, Clock, GameType, LeagueConfig, LeagueError,
    LeagueStore, Pilot, Report, StatLine, Suggestion, Team, TeamSize, Void,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What happened when a team asked for a rematch.
#[derive(Debug, Clone)]
pub enum RematchOutcome {
    /// Waiting on the other team.
    Requested(Challenge),
    /// Both teams agreed; `rematch` is the new challenge.
    Created {
        original: Challenge,
        rematch: Challenge,
    },
}

pub struct ChallengeService<S: LeagueStore> {
    store: Arc<S>,
    config: LeagueConfig,
}

impl<S: LeagueStore> ChallengeService<S> {
    pub fn new(store: Arc<S>, config: LeagueConfig) -> Self {
        Self { store, config }
    }

    // ------------------------------------------------------------------
    // Loading helpers
    // ------------------------------------------------------------------

    pub async fn get_challenge(&self, challenge_id: u64) -> Result<Challenge, LeagueError> {
        check::challenge_found(self.store.get_challenge(challenge_id).await?, challenge_id)
    }

    async fn team(&self, team_id: u64) -> Result<Team, LeagueError> {
        check::team_found(self.store.get_team(team_id).await?, &team_id.to_string())
    }

    async fn find_team(&self, query: &str) -> Result<Team, LeagueError> {
        check::team_found(self.store.find_team(query).await?, query)
    }

    /// The actor's team (as founder/captain), the challenge, and the opponent id.
    async fn participant(
        &self,
        actor: u64,
        challenge_id: u64,
    ) -> Result<(Team, Challenge, u64), LeagueError> {
        let team = check::pilot_on_team(self.store.find_team_for_pilot(actor).await?)?;
        check::pilot_is_captain_or_founder(&team, actor)?;
        let challenge = self.get_challenge(challenge_id).await?;
        let opponent = check::participating_team(&challenge, team.id)?;
        Ok((team, challenge, opponent))
    }

    async fn save(&self, challenge: &Challenge) -> Result<(), LeagueError> {
        self.store.save_challenge(challenge).await
    }

    /// Snapshot both rosters as the pilots allowed to appear in the box score.
    async fn authorize_rosters(&self, challenge: &mut Challenge) -> Result<(), LeagueError> {
        let mut authorized = Vec::new();
        for team_id in [challenge.challenging_team, challenge.challenged_team] {
            let team = self.team(team_id).await?;
            authorized.extend(team.members.iter().map(|m| AuthorizedPilot {
                pilot_id: m.pilot_id,
                team_id,
            }));
        }
        challenge.authorized_pilots = authorized;
        Ok(())
    }

    /// Changing the size invalidates a map picked from the old home map set.
    fn apply_team_size(challenge: &mut Challenge, size: TeamSize) {
        if challenge.team_size != Some(size) && !challenge.used_neutral_map {
            challenge.map = None;
        }
        challenge.team_size = Some(size);
        challenge.suggested_team_size = None;
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    pub async fn create_challenge(
        &self,
        actor: u64,
        opponent_query: &str,
        game_type: GameType,
    ) -> Result<Challenge, LeagueError> {
        let season = self.store.get_season().await?;
        check::not_postseason(&season)?;

        let team = check::pilot_on_team(self.store.find_team_for_pilot(actor).await?)?;
        check::pilot_is_captain_or_founder(&team, actor)?;
        check::team_active(&team)?;

        let opponent = self.find_team(opponent_query).await?;
        check::team_active(&opponent)?;
        check::different_teams(&team, &opponent)?;

        check::roster_meets_minimum(&team, self.config.min_roster)?;
        check::roster_meets_minimum(&opponent, self.config.min_roster)?;

        let existing = self.store.list_challenges_for_team(team.id).await?;
        check::no_open_challenge_between(&existing, team.id, opponent.id, game_type)?;

        check::has_home_maps_for(&team, game_type, &self.config)?;
        check::has_home_maps_for(&opponent, game_type, &self.config)?;

        // The challenged team has home maps unless it carries more penalties.
        let home_map_team = if opponent.penalties > team.penalties {
            team.id
        } else {
            opponent.id
        };

        let challenge = self
            .store
            .insert_challenge(Challenge::new(
                season.number,
                team.id,
                opponent.id,
                game_type,
                home_map_team,
                Utc::now(),
            ))
            .await?;

        tracing::info!(
            challenge_id = challenge.id,
            challenging = team.id,
            challenged = opponent.id,
            game_type = game_type.code(),
            "Challenge created"
        );
        Ok(challenge)
    }

    /// Admin-created match with an explicit home team, allowed in the postseason.
    pub async fn admin_create_challenge(
        &self,
        home_query: &str,
        away_query: &str,
        game_type: GameType,
    ) -> Result<Challenge, LeagueError> {
        let season = self.store.get_season().await?;
        let home = self.find_team(home_query).await?;
        let away = self.find_team(away_query).await?;
        check::team_active(&home)?;
        check::team_active(&away)?;
        check::different_teams(&home, &away)?;

        let mut challenge = Challenge::new(
            season.number,
            away.id,
            home.id,
            game_type,
            home.id,
            Utc::now(),
        );
        challenge.postseason = season.postseason;
        let challenge = self.store.insert_challenge(challenge).await?;

        tracing::info!(
            challenge_id = challenge.id,
            home = home.id,
            away = away.id,
            postseason = challenge.postseason,
            "Challenge created by admin"
        );
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Team size
    // ------------------------------------------------------------------

    pub async fn suggest_team_size(
        &self,
        actor: u64,
        challenge_id: u64,
        size: TeamSize,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, opponent_id) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_unscheduled(&challenge)?;
        let opponent = self.team(opponent_id).await?;
        check::roster_meets_minimum(&team, size.players())?;
        check::roster_meets_minimum(&opponent, size.players())?;

        challenge.suggested_team_size = Some(Suggestion {
            value: size,
            team: team.id,
        });
        self.save(&challenge).await?;
        Ok(challenge)
    }

    pub async fn confirm_team_size(
        &self,
        actor: u64,
        challenge_id: u64,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, opponent_id) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_unscheduled(&challenge)?;
        let size = check::suggestion_from_opponent(
            challenge.suggested_team_size.as_ref(),
            team.id,
            "team size",
        )?;
        let opponent = self.team(opponent_id).await?;
        check::roster_meets_minimum(&team, size.players())?;
        check::roster_meets_minimum(&opponent, size.players())?;

        Self::apply_team_size(&mut challenge, size);
        self.save(&challenge).await?;
        tracing::info!(challenge_id, size = %size, "Team size confirmed");
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Maps
    // ------------------------------------------------------------------

    /// The away team picks one of the home team's maps by option number.
    pub async fn pick_map(
        &self,
        actor: u64,
        challenge_id: u64,
        option: usize,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_unreported(&challenge)?;
        check::is_away_team(&challenge, team.id)?;
        let size = check::team_size_set(&challenge)?;
        let home = self.team(challenge.home_map_team).await?;
        let set = check::home_map_set_complete(&home, challenge.game_type, size, &self.config)?;
        let map = check::home_map_option(set, option)?;

        challenge.map = Some(map);
        challenge.used_neutral_map = false;
        challenge.suggested_map = None;
        self.save(&challenge).await?;
        tracing::info!(challenge_id, map = ?challenge.map, "Home map picked");
        Ok(challenge)
    }

    pub async fn suggest_neutral_map(
        &self,
        actor: u64,
        challenge_id: u64,
        map: &str,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_unreported(&challenge)?;
        let pool = self.store.list_maps(challenge.game_type).await?;
        let map = check::map_in_pool(&pool, map, challenge.game_type)?;

        // Without an agreed size, the map must avoid every home set of the game type.
        let home = self.team(challenge.home_map_team).await?;
        for set in home.home_maps.iter().filter(|set| {
            set.game_type == challenge.game_type
                && challenge.team_size.map_or(true, |size| set.team_size == size)
        }) {
            check::map_not_home_map(Some(set), &map)?;
        }

        challenge.suggested_map = Some(Suggestion {
            value: map,
            team: team.id,
        });
        self.save(&challenge).await?;
        Ok(challenge)
    }

    pub async fn confirm_neutral_map(
        &self,
        actor: u64,
        challenge_id: u64,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_unreported(&challenge)?;
        let map = check::suggestion_from_opponent(challenge.suggested_map.as_ref(), team.id, "map")?;

        challenge.map = Some(map);
        challenge.used_neutral_map = true;
        challenge.suggested_map = None;
        self.save(&challenge).await?;
        tracing::info!(challenge_id, map = ?challenge.map, "Neutral map confirmed");
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Match time
    // ------------------------------------------------------------------

    /// Suggest a match time, typed in the actor's timezone (pilot, then team).
    pub async fn suggest_time(
        &self,
        actor: &Pilot,
        challenge_id: u64,
        input: &str,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor.id, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_unreported(&challenge)?;

        let now = Utc::now();
        let timezone = actor.timezone.as_deref().or(team.timezone.as_deref());
        let time = parse_match_time(input, timezone, now)?;
        check::time_in_future(time, now)?;

        challenge.suggested_time = Some(Suggestion {
            value: time,
            team: team.id,
        });
        self.save(&challenge).await?;
        Ok(challenge)
    }

    pub async fn confirm_time(
        &self,
        actor: u64,
        challenge_id: u64,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_unreported(&challenge)?;
        let time =
            check::suggestion_from_opponent(challenge.suggested_time.as_ref(), team.id, "time")?;
        check::time_in_future(time, Utc::now())?;
        check::clock_deadline_respected(&challenge, time)?;

        challenge.match_time = Some(time);
        challenge.suggested_time = None;
        self.authorize_rosters(&mut challenge).await?;
        self.save(&challenge).await?;
        tracing::info!(challenge_id, match_time = %time, "Match time confirmed");
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// How many challenges the team has put a clock on this season.
    pub async fn clocks_used(&self, team_id: u64, season: u32) -> Result<u32, LeagueError> {
        let used = self
            .store
            .list_challenges_for_team(team_id)
            .await?
            .iter()
            .filter(|c| c.season == season)
            .filter(|c| c.clock.as_ref().map(|clock| clock.team) == Some(team_id))
            .count();
        Ok(used as u32)
    }

    pub async fn clock(&self, actor: u64, challenge_id: u64) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        let season = self.store.get_season().await?;
        let used = self.clocks_used(team.id, season.number).await?;
        check::clock_available(&challenge, &team, used, &season, &self.config)?;

        let now = Utc::now();
        challenge.clock = Some(Clock {
            team: team.id,
            clocked_at: now,
            deadline: now + self.config.clock_duration(),
        });
        self.save(&challenge).await?;
        tracing::info!(challenge_id, team_id = team.id, "Challenge clocked");
        Ok(challenge)
    }

    pub async fn extend_clock(&self, challenge_id: u64) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_clocked(&challenge)?;
        let extension = self.config.clock_extension();
        if let Some(clock) = challenge.clock.as_mut() {
            clock.deadline += extension;
        }
        self.save(&challenge).await?;
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// The losing team reports its own score first.
    pub async fn report(
        &self,
        actor: u64,
        challenge_id: u64,
        own_score: i64,
        opponent_score: i64,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::team_size_set(&challenge)?;
        check::map_set(&challenge)?;
        check::match_played(&challenge, Utc::now())?;
        let (own, opponent) = check::valid_report_scores(own_score, opponent_score)?;

        let (challenging_score, challenged_score) = if team.id == challenge.challenging_team {
            (own, opponent)
        } else {
            (opponent, own)
        };
        challenge.report = Some(Report {
            reporting_team: team.id,
            challenging_score,
            challenged_score,
            reported_at: Utc::now(),
        });
        self.save(&challenge).await?;
        tracing::info!(
            challenge_id,
            challenging_score,
            challenged_score,
            "Match reported"
        );
        Ok(challenge)
    }

    pub async fn confirm_report(
        &self,
        actor: u64,
        challenge_id: u64,
    ) -> Result<Challenge, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::report_from_opponent(&challenge, team.id)?;

        challenge.confirmed_at = Some(Utc::now());
        self.save(&challenge).await?;
        tracing::info!(challenge_id, "Match confirmed");
        Ok(challenge)
    }

    pub async fn request_rematch(
        &self,
        actor: u64,
        challenge_id: u64,
    ) -> Result<RematchOutcome, LeagueError> {
        let (team, mut challenge, _) = self.participant(actor, challenge_id).await?;
        check::rematch_allowed(&challenge)?;
        check::rematch_not_requested(&challenge, team.id)?;

        if challenge.rematch_requested_by.is_none() {
            challenge.rematch_requested_by = Some(team.id);
            self.save(&challenge).await?;
            return Ok(RematchOutcome::Requested(challenge));
        }

        let season = self.store.get_season().await?;
        let mut rematch = Challenge::new(
            season.number,
            challenge.challenging_team,
            challenge.challenged_team,
            challenge.game_type,
            challenge.home_map_team,
            Utc::now(),
        );
        rematch.postseason = challenge.postseason;
        rematch.team_size = challenge.team_size;
        rematch.map = challenge.map.clone();
        rematch.used_neutral_map = challenge.used_neutral_map;
        let rematch = self.store.insert_challenge(rematch).await?;

        challenge.rematch_challenge = Some(rematch.id);
        self.save(&challenge).await?;
        tracing::info!(challenge_id, rematch_id = rematch.id, "Rematch created");
        Ok(RematchOutcome::Created {
            original: challenge,
            rematch,
        })
    }

    // ------------------------------------------------------------------
    // Casting
    // ------------------------------------------------------------------

    pub async fn cast(&self, pilot_id: u64, challenge_id: u64) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::challenge_scheduled(&challenge)?;
        let caster_team = self.store.find_team_for_pilot(pilot_id).await?;
        check::caster_available(&challenge, caster_team.as_ref())?;

        challenge.caster = Some(pilot_id);
        self.save(&challenge).await?;
        Ok(challenge)
    }

    pub async fn uncast(&self, pilot_id: u64, challenge_id: u64) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_open(&challenge)?;
        check::is_caster(&challenge, pilot_id)?;

        challenge.caster = None;
        self.save(&challenge).await?;
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Admin overrides
    // ------------------------------------------------------------------

    pub async fn void(&self, challenge_id: u64, reason: &str) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_not_voided(&challenge)?;
        challenge.voided = Some(Void {
            at: Utc::now(),
            reason: reason.trim().to_string(),
        });
        self.save(&challenge).await?;
        tracing::warn!(challenge_id, reason, "Challenge voided");
        Ok(challenge)
    }

    pub async fn force_team_size(
        &self,
        challenge_id: u64,
        size: TeamSize,
    ) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_open(&challenge)?;
        Self::apply_team_size(&mut challenge, size);
        self.save(&challenge).await?;
        Ok(challenge)
    }

    pub async fn force_map(&self, challenge_id: u64, map: &str) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_open(&challenge)?;
        let pool = self.store.list_maps(challenge.game_type).await?;
        let map = check::map_in_pool(&pool, map, challenge.game_type)?;

        let home = self.team(challenge.home_map_team).await?;
        let is_home_map = challenge
            .team_size
            .and_then(|size| home.home_map_set(challenge.game_type, size))
            .map(|set| set.maps.contains(&map))
            .unwrap_or(false);

        challenge.map = Some(map);
        challenge.used_neutral_map = !is_home_map;
        challenge.suggested_map = None;
        self.save(&challenge).await?;
        Ok(challenge)
    }

    /// Set the match time directly; the input is read as UTC.
    pub async fn force_time(&self, challenge_id: u64, input: &str) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_open(&challenge)?;
        let time = parse_match_time(input, None, Utc::now())?;

        challenge.match_time = Some(time);
        challenge.suggested_time = None;
        self.authorize_rosters(&mut challenge).await?;
        self.save(&challenge).await?;
        Ok(challenge)
    }

    /// Record a final score and confirm it in one step.
    pub async fn force_report(
        &self,
        challenge_id: u64,
        challenging_score: i64,
        challenged_score: i64,
    ) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_open(&challenge)?;
        let (challenging_score, challenged_score) =
            check::valid_scores(challenging_score, challenged_score)?;

        let now = Utc::now();
        challenge.report = Some(Report {
            reporting_team: challenge.challenging_team,
            challenging_score,
            challenged_score,
            reported_at: now,
        });
        challenge.confirmed_at = Some(now);
        if challenge.authorized_pilots.is_empty() {
            self.authorize_rosters(&mut challenge).await?;
        }
        self.save(&challenge).await?;
        tracing::info!(challenge_id, "Match result forced by admin");
        Ok(challenge)
    }

    pub async fn set_title(
        &self,
        challenge_id: u64,
        title: Option<String>,
    ) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        challenge.title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.save(&challenge).await?;
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    /// Add (or replace) one pilot's stat line.
    pub async fn add_stat(
        &self,
        challenge_id: u64,
        pilot: &Pilot,
        team_query: &str,
        kills: u32,
        assists: u32,
        deaths: u32,
    ) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_confirmed(&challenge)?;
        let team = self.find_team(team_query).await?;
        check::participating_team(&challenge, team.id)?;
        check::pilot_authorized(&challenge, pilot, team.id)?;
        check::valid_stat_line(kills, assists, deaths)?;

        challenge.stats.retain(|line| line.pilot_id != pilot.id);
        challenge.stats.push(StatLine {
            pilot_id: pilot.id,
            team_id: team.id,
            kills,
            assists,
            deaths,
        });
        self.save(&challenge).await?;
        Ok(challenge)
    }

    pub async fn clear_stats(&self, challenge_id: u64) -> Result<Challenge, LeagueError> {
        let mut challenge = self.get_challenge(challenge_id).await?;
        challenge.stats.clear();
        challenge.tracker_game_id = None;
        self.save(&challenge).await?;
        Ok(challenge)
    }

    /// Pull a game from the tracker and store it as the challenge's box score.
    /// `blue_team_query` names the league team that played as blue.
    pub async fn import_box_score<T>(
        &self,
        tracker: &T,
        challenge_id: u64,
        game_id: u64,
        blue_team_query: &str,
    ) -> Result<Challenge, LeagueError>
    where
        T: TrackerClient + ?Sized,
    {
        let mut challenge = self.get_challenge(challenge_id).await?;
        check::challenge_confirmed(&challenge)?;
        let size = check::team_size_set(&challenge)?;
        let blue = self.find_team(blue_team_query).await?;
        let orange_id = check::participating_team(&challenge, blue.id)?;

        let game = tracker.fetch_game(game_id).await?;

        // Resolve every name first so all unknown pilots are reported together.
        let mut unknown = Vec::new();
        let mut ambiguous = Vec::new();
        let mut found = Vec::with_capacity(game.players.len());
        for player in game.players {
            match self.store.find_pilot_by_name(&player.name).await {
                Ok(Some(pilot)) => found.push((pilot, player)),
                Ok(None) => unknown.push(player.name),
                Err(LeagueError::AmbiguousPilot(name)) => ambiguous.push(name),
                Err(e) => return Err(e),
            }
        }
        if !unknown.is_empty() {
            return Err(LeagueError::UnknownPilots(unknown));
        }
        if let Some(name) = ambiguous.into_iter().next() {
            return Err(LeagueError::AmbiguousPilot(name));
        }

        let mut resolved = Vec::with_capacity(found.len());
        for (pilot, player) in found {
            let team_id = match player.team {
                TeamColor::Blue => blue.id,
                TeamColor::Orange => orange_id,
            };
            check::pilot_authorized(&challenge, &pilot, team_id)?;
            resolved.push(ResolvedPlayer {
                pilot_id: pilot.id,
                pilot_name: pilot.name,
                team_id,
                player,
            });
        }

        challenge.stats = build_stat_lines(&resolved, blue.id, orange_id, size.players())?;
        challenge.tracker_game_id = Some(game.id);
        self.save(&challenge).await?;
        tracing::info!(challenge_id, game_id, "Box score imported");
        Ok(challenge)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub async fn challenges_for_team(
        &self,
        team_id: u64,
        include_closed: bool,
    ) -> Result<Vec<Challenge>, LeagueError> {
        Ok(self
            .store
            .list_challenges_for_team(team_id)
            .await?
            .into_iter()
            .filter(|c| include_closed || c.is_open())
            .collect())
    }

    /// Scheduled, unreported matches from `now` on, soonest first.
    pub async fn upcoming_matches(&self, now: DateTime<Utc>) -> Result<Vec<Challenge>, LeagueError> {
        let mut upcoming: Vec<Challenge> = self
            .store
            .list_open_challenges()
            .await?
            .into_iter()
            .filter(|c| c.report.is_none() && c.match_time.map_or(false, |t| t >= now))
            .collect();
        upcoming.sort_by_key(|c| c.match_time);
        Ok(upcoming)
    }

    /// Clocked challenges that blew through their deadline unscheduled.
    pub async fn expired_clocks(&self, now: DateTime<Utc>) -> Result<Vec<Challenge>, LeagueError> {
        Ok(self
            .store
            .list_open_challenges()
            .await?
            .into_iter()
            .filter(|c| c.match_time.is_none())
            .filter(|c| c.clock.as_ref().map_or(false, |clock| clock.deadline < now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::challenges::box_score::{TrackerGame, TrackerPlayer};
    use crate::core::league::{ChallengeState, SeasonState, SettingsStore, TeamStore};
    use crate::core::teams::TeamService;
    use crate::infra::league::InMemoryLeagueStore;
    use async_trait::async_trait;
    use chrono::Duration;

    const MAPS: [&str; 6] = ["Vault", "Foundry", "Backbone", "Fuel", "Wraith", "Labyrinth"];

    struct League {
        store: Arc<InMemoryLeagueStore>,
        teams: TeamService<InMemoryLeagueStore>,
        challenges: ChallengeService<InMemoryLeagueStore>,
        /// Team A: founder 1, pilots 2-3. Team B: founder 10, pilots 11-12.
        a: Team,
        b: Team,
    }

    async fn league() -> League {
        let store = Arc::new(InMemoryLeagueStore::new());
        for map in MAPS {
            store.add_map(GameType::TeamAnarchy, map).await.unwrap();
        }
        let teams = TeamService::new(Arc::clone(&store), LeagueConfig::default());
        let challenges = ChallengeService::new(Arc::clone(&store), LeagueConfig::default());

        let a = build_team(&teams, 1, "Alpha", "ALP", &["Vault", "Foundry", "Backbone"]).await;
        let b = build_team(&teams, 10, "Bravo", "BRV", &["Fuel", "Wraith", "Labyrinth"]).await;
        League {
            store,
            teams,
            challenges,
            a,
            b,
        }
    }

    async fn build_team(
        teams: &TeamService<InMemoryLeagueStore>,
        founder: u64,
        name: &str,
        tag: &str,
        home_maps: &[&str],
    ) -> Team {
        let f = teams
            .ensure_pilot(founder, &format!("pilot{}", founder))
            .await
            .unwrap();
        let mut team = teams.create_team(&f, name, tag).await.unwrap();
        for id in [founder + 1, founder + 2] {
            let p = teams.ensure_pilot(id, &format!("pilot{}", id)).await.unwrap();
            teams.invite_pilot(founder, &p).await.unwrap();
            team = teams.accept_invite(&p, tag).await.unwrap();
        }
        let maps: Vec<String> = home_maps.iter().map(|m| m.to_string()).collect();
        for size in [TeamSize::TwoVTwo, TeamSize::ThreeVThree] {
            team = teams
                .set_home_maps(founder, GameType::TeamAnarchy, size, maps.clone())
                .await
                .unwrap();
        }
        team
    }

    /// A (challenger) vs B (home), 2v2 on B's first home map.
    async fn agreed_challenge(l: &League) -> Challenge {
        let c = l
            .challenges
            .create_challenge(1, "BRV", GameType::TeamAnarchy)
            .await
            .unwrap();
        l.challenges
            .suggest_team_size(1, c.id, TeamSize::TwoVTwo)
            .await
            .unwrap();
        l.challenges.confirm_team_size(10, c.id).await.unwrap();
        l.challenges.pick_map(1, c.id, 1).await.unwrap()
    }

    /// Agreed challenge whose match time is already in the past.
    async fn played_challenge(l: &League) -> Challenge {
        let c = agreed_challenge(l).await;
        let past = (Utc::now() - Duration::hours(2))
            .format("%Y-%m-%d %H:%M")
            .to_string();
        l.challenges.force_time(c.id, &past).await.unwrap()
    }

    #[tokio::test]
    async fn create_challenge_sets_home_team() {
        let l = league().await;
        let c = l
            .challenges
            .create_challenge(1, "bravo", GameType::TeamAnarchy)
            .await
            .unwrap();
        assert_eq!(c.challenging_team, l.a.id);
        assert_eq!(c.challenged_team, l.b.id);
        assert_eq!(c.home_map_team, l.b.id);
        assert_eq!(c.state(), ChallengeState::Unscheduled);

        // Only one open challenge per pair and game type.
        assert!(matches!(
            l.challenges
                .create_challenge(10, "ALP", GameType::TeamAnarchy)
                .await,
            Err(LeagueError::OpenChallengeExists { .. })
        ));
    }

    #[tokio::test]
    async fn penalized_challenged_team_loses_home_maps() {
        let l = league().await;
        l.teams.penalize_team("BRV").await.unwrap();
        let c = l
            .challenges
            .create_challenge(1, "BRV", GameType::TeamAnarchy)
            .await
            .unwrap();
        assert_eq!(c.home_map_team, l.a.id);
        assert_eq!(c.away_team(), l.b.id);
    }

    #[tokio::test]
    async fn create_challenge_preconditions() {
        let l = league().await;
        // Pilots (non-captains) cannot challenge.
        assert_eq!(
            l.challenges
                .create_challenge(2, "BRV", GameType::TeamAnarchy)
                .await
                .unwrap_err(),
            LeagueError::NotCaptain
        );
        assert_eq!(
            l.challenges
                .create_challenge(1, "ALP", GameType::TeamAnarchy)
                .await
                .unwrap_err(),
            LeagueError::SameTeam
        );
        // No CTF home maps anywhere.
        assert!(matches!(
            l.challenges
                .create_challenge(1, "BRV", GameType::CaptureTheFlag)
                .await,
            Err(LeagueError::NoHomeMaps { .. })
        ));
        l.store
            .save_season(&SeasonState {
                number: 1,
                postseason: true,
            })
            .await
            .unwrap();
        assert_eq!(
            l.challenges
                .create_challenge(1, "BRV", GameType::TeamAnarchy)
                .await
                .unwrap_err(),
            LeagueError::Postseason
        );
    }

    #[tokio::test]
    async fn team_size_needs_confirmation_from_the_other_team() {
        let l = league().await;
        let c = l
            .challenges
            .create_challenge(1, "BRV", GameType::TeamAnarchy)
            .await
            .unwrap();
        l.challenges
            .suggest_team_size(1, c.id, TeamSize::ThreeVThree)
            .await
            .unwrap();
        assert_eq!(
            l.challenges.confirm_team_size(2, c.id).await.unwrap_err(),
            LeagueError::NotCaptain
        );
        assert_eq!(
            l.challenges.confirm_team_size(1, c.id).await.unwrap_err(),
            LeagueError::OwnSuggestion("team size")
        );
        let c = l.challenges.confirm_team_size(10, c.id).await.unwrap();
        assert_eq!(c.team_size, Some(TeamSize::ThreeVThree));
        assert!(c.suggested_team_size.is_none());

        // 4v4 is more than either roster holds.
        assert!(matches!(
            l.challenges
                .suggest_team_size(1, c.id, TeamSize::FourVFour)
                .await,
            Err(LeagueError::RosterTooSmall { .. })
        ));
    }

    #[tokio::test]
    async fn away_team_picks_home_map() {
        let l = league().await;
        let c = l
            .challenges
            .create_challenge(1, "BRV", GameType::TeamAnarchy)
            .await
            .unwrap();
        assert_eq!(
            l.challenges.pick_map(1, c.id, 1).await.unwrap_err(),
            LeagueError::TeamSizeNotSet(c.id)
        );
        l.challenges
            .force_team_size(c.id, TeamSize::TwoVTwo)
            .await
            .unwrap();

        assert_eq!(
            l.challenges.pick_map(10, c.id, 1).await.unwrap_err(),
            LeagueError::NotAwayTeam
        );
        assert_eq!(
            l.challenges.pick_map(1, c.id, 4).await.unwrap_err(),
            LeagueError::InvalidMapOption { max: 3 }
        );
        let c = l.challenges.pick_map(1, c.id, 2).await.unwrap();
        assert_eq!(c.map.as_deref(), Some("Wraith"));
        assert!(!c.used_neutral_map);

        // Changing the size drops the picked home map.
        let c = l
            .challenges
            .force_team_size(c.id, TeamSize::ThreeVThree)
            .await
            .unwrap();
        assert!(c.map.is_none());
    }

    #[tokio::test]
    async fn neutral_maps_exclude_home_maps() {
        let l = league().await;
        let c = l
            .challenges
            .create_challenge(1, "BRV", GameType::TeamAnarchy)
            .await
            .unwrap();
        assert!(matches!(
            l.challenges.suggest_neutral_map(1, c.id, "fuel").await,
            Err(LeagueError::MapIsHomeMap(_))
        ));
        assert!(matches!(
            l.challenges.suggest_neutral_map(1, c.id, "Nowhere").await,
            Err(LeagueError::MapNotInPool { .. })
        ));

        l.challenges
            .suggest_neutral_map(10, c.id, "vault")
            .await
            .unwrap();
        let c = l.challenges.confirm_neutral_map(1, c.id).await.unwrap();
        assert_eq!(c.map.as_deref(), Some("Vault"));
        assert!(c.used_neutral_map);

        // A neutral map survives a size change.
        let c = l
            .challenges
            .force_team_size(c.id, TeamSize::ThreeVThree)
            .await
            .unwrap();
        assert_eq!(c.map.as_deref(), Some("Vault"));
    }

    #[tokio::test]
    async fn time_flow_snapshots_rosters() {
        let l = league().await;
        let c = agreed_challenge(&l).await;
        let future = (Utc::now() + Duration::days(3))
            .format("%Y-%m-%d %H:%M")
            .to_string();

        let pilot = l.teams.ensure_pilot(1, "pilot1").await.unwrap();
        let c = l.challenges.suggest_time(&pilot, c.id, &future).await.unwrap();
        assert_eq!(c.state(), ChallengeState::TimeSuggested);

        let c = l.challenges.confirm_time(10, c.id).await.unwrap();
        assert_eq!(c.state(), ChallengeState::Scheduled);
        assert_eq!(c.authorized_pilots.len(), 6);
        assert!(c.is_authorized(11, l.b.id));
        assert!(!c.is_authorized(11, l.a.id));

        let past = (Utc::now() - Duration::days(1))
            .format("%Y-%m-%d %H:%M")
            .to_string();
        assert_eq!(
            l.challenges
                .suggest_time(&pilot, c.id, &past)
                .await
                .unwrap_err(),
            LeagueError::TimeInPast
        );
    }

    #[tokio::test]
    async fn suggested_time_uses_pilot_timezone() {
        let l = league().await;
        let c = agreed_challenge(&l).await;
        let pilot = l.teams.ensure_pilot(1, "pilot1").await.unwrap();
        let pilot = l
            .teams
            .set_pilot_timezone(&pilot, "America/New_York")
            .await
            .unwrap();

        let c = l
            .challenges
            .suggest_time(&pilot, c.id, "2099-07-01 20:00")
            .await
            .unwrap();
        let suggested = c.suggested_time.unwrap().value;
        assert_eq!(suggested.format("%Y-%m-%d %H:%M").to_string(), "2099-07-02 00:00");
    }

    #[tokio::test]
    async fn clock_limits_and_deadline() {
        let l = league().await;
        let c = l
            .challenges
            .create_challenge(1, "BRV", GameType::TeamAnarchy)
            .await
            .unwrap();
        let c = l.challenges.clock(10, c.id).await.unwrap();
        let clock = c.clock.clone().unwrap();
        assert_eq!(clock.team, l.b.id);
        assert_eq!(clock.deadline - clock.clocked_at, Duration::days(28));
        assert_eq!(l.challenges.clocks_used(l.b.id, 1).await.unwrap(), 1);

        assert_eq!(
            l.challenges.clock(1, c.id).await.unwrap_err(),
            LeagueError::AlreadyClocked(c.id)
        );

        let extended = l.challenges.extend_clock(c.id).await.unwrap();
        assert_eq!(
            extended.clock.unwrap().deadline,
            clock.deadline + Duration::days(14)
        );

        assert!(l.challenges.expired_clocks(Utc::now()).await.unwrap().is_empty());
        let later = Utc::now() + Duration::days(60);
        let expired = l.challenges.expired_clocks(later).await.unwrap();
        assert_eq!(expired.len(), 1);
    }

    #[tokio::test]
    async fn confirm_time_respects_clock_deadline() {
        let l = league().await;
        let c = agreed_challenge(&l).await;
        l.challenges.clock(10, c.id).await.unwrap();

        let pilot = l.teams.ensure_pilot(1, "pilot1").await.unwrap();
        let too_late = (Utc::now() + Duration::days(40))
            .format("%Y-%m-%d %H:%M")
            .to_string();
        l.challenges
            .suggest_time(&pilot, c.id, &too_late)
            .await
            .unwrap();
        assert!(matches!(
            l.challenges.confirm_time(10, c.id).await,
            Err(LeagueError::PastClockDeadline(_))
        ));
    }

    #[tokio::test]
    async fn report_and_confirm() {
        let l = league().await;
        let c = agreed_challenge(&l).await;

        // Not scheduled yet.
        assert_eq!(
            l.challenges.report(1, c.id, 10, 20).await.unwrap_err(),
            LeagueError::NotScheduled(c.id)
        );

        let c = played_challenge_from(&l, c).await;
        assert!(matches!(
            l.challenges.report(1, c.id, 20, 10).await,
            Err(LeagueError::InvalidScore(_))
        ));

        // B lost 10-20 and reports.
        let c = l.challenges.report(10, c.id, 10, 20).await.unwrap();
        let report = c.report.clone().unwrap();
        assert_eq!(report.challenging_score, 20);
        assert_eq!(report.challenged_score, 10);
        assert_eq!(c.winner(), Some(l.a.id));
        assert_eq!(c.state(), ChallengeState::Reported);

        assert_eq!(
            l.challenges.confirm_report(10, c.id).await.unwrap_err(),
            LeagueError::OwnReport
        );
        let c = l.challenges.confirm_report(1, c.id).await.unwrap();
        assert_eq!(c.state(), ChallengeState::Confirmed);

        assert_eq!(
            l.challenges.report(10, c.id, 1, 2).await.unwrap_err(),
            LeagueError::ChallengeConfirmed(c.id)
        );
    }

    async fn played_challenge_from(l: &League, c: Challenge) -> Challenge {
        let past = (Utc::now() - Duration::hours(2))
            .format("%Y-%m-%d %H:%M")
            .to_string();
        l.challenges.force_time(c.id, &past).await.unwrap()
    }

    #[tokio::test]
    async fn future_matches_cannot_be_reported() {
        let l = league().await;
        let c = agreed_challenge(&l).await;
        let future = (Utc::now() + Duration::days(1))
            .format("%Y-%m-%d %H:%M")
            .to_string();
        l.challenges.force_time(c.id, &future).await.unwrap();
        assert_eq!(
            l.challenges.report(1, c.id, 1, 2).await.unwrap_err(),
            LeagueError::MatchNotPlayed
        );
    }

    #[tokio::test]
    async fn tied_matches_can_be_rematched() {
        let l = league().await;
        let c = played_challenge(&l).await;
        l.challenges.report(1, c.id, 15, 15).await.unwrap();
        l.challenges.confirm_report(10, c.id).await.unwrap();

        match l.challenges.request_rematch(1, c.id).await.unwrap() {
            RematchOutcome::Requested(c) => assert_eq!(c.rematch_requested_by, Some(l.a.id)),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            l.challenges.request_rematch(1, c.id).await.unwrap_err(),
            LeagueError::RematchAlreadyRequested
        );

        match l.challenges.request_rematch(10, c.id).await.unwrap() {
            RematchOutcome::Created { original, rematch } => {
                assert_eq!(original.state(), ChallengeState::Rematched);
                assert_eq!(original.rematch_challenge, Some(rematch.id));
                assert_eq!(rematch.map, original.map);
                assert_eq!(rematch.team_size, original.team_size);
                assert_eq!(rematch.state(), ChallengeState::Unscheduled);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn decided_matches_cannot_be_rematched() {
        let l = league().await;
        let c = played_challenge(&l).await;
        l.challenges.force_report(c.id, 20, 10).await.unwrap();
        assert_eq!(
            l.challenges.request_rematch(1, c.id).await.unwrap_err(),
            LeagueError::RematchNotAllowed
        );
    }

    #[tokio::test]
    async fn casting_rules() {
        let l = league().await;
        let c = agreed_challenge(&l).await;
        let caster = l.teams.ensure_pilot(99, "caster").await.unwrap();

        assert_eq!(
            l.challenges.cast(caster.id, c.id).await.unwrap_err(),
            LeagueError::NotScheduled(c.id)
        );
        let future = (Utc::now() + Duration::days(1))
            .format("%Y-%m-%d %H:%M")
            .to_string();
        l.challenges.force_time(c.id, &future).await.unwrap();

        assert_eq!(
            l.challenges.cast(2, c.id).await.unwrap_err(),
            LeagueError::CasterOnTeam
        );
        let c = l.challenges.cast(caster.id, c.id).await.unwrap();
        assert_eq!(c.caster, Some(99));
        assert_eq!(
            l.challenges.uncast(2, c.id).await.unwrap_err(),
            LeagueError::NotCaster(c.id)
        );
        let c = l.challenges.uncast(99, c.id).await.unwrap();
        assert!(c.caster.is_none());

        let upcoming = l.challenges.upcoming_matches(Utc::now()).await.unwrap();
        assert_eq!(upcoming.len(), 1);
    }

    #[tokio::test]
    async fn voided_challenges_reject_everything() {
        let l = league().await;
        let c = agreed_challenge(&l).await;
        let c = l.challenges.void(c.id, "no show").await.unwrap();
        assert_eq!(c.state(), ChallengeState::Voided);
        assert_eq!(
            l.challenges.clock(1, c.id).await.unwrap_err(),
            LeagueError::ChallengeVoided(c.id)
        );
        assert_eq!(
            l.challenges.void(c.id, "again").await.unwrap_err(),
            LeagueError::ChallengeVoided(c.id)
        );
        // The pair can challenge again.
        assert!(l
            .challenges
            .create_challenge(1, "BRV", GameType::TeamAnarchy)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn stats_only_for_authorized_pilots() {
        let l = league().await;
        let c = played_challenge(&l).await;
        l.challenges.force_report(c.id, 20, 10).await.unwrap();

        let p2 = l.store.get_pilot(2).await.unwrap().unwrap();
        let c = l.challenges.add_stat(c.id, &p2, "ALP", 10, 2, 3).await.unwrap();
        assert_eq!(c.stats.len(), 1);
        // Re-adding replaces the line.
        let c = l.challenges.add_stat(c.id, &p2, "ALP", 11, 2, 3).await.unwrap();
        assert_eq!(c.stats.len(), 1);
        assert_eq!(c.stats[0].kills, 11);

        assert!(matches!(
            l.challenges.add_stat(c.id, &p2, "BRV", 1, 1, 1).await,
            Err(LeagueError::PilotNotAuthorized(_))
        ));
    }

    struct FakeTracker(TrackerGame);

    #[async_trait]
    impl TrackerClient for FakeTracker {
        async fn fetch_game(&self, _game_id: u64) -> Result<TrackerGame, LeagueError> {
            Ok(self.0.clone())
        }
    }

    fn player(name: &str, team: TeamColor, kills: u32) -> TrackerPlayer {
        TrackerPlayer {
            name: name.to_string(),
            team,
            kills,
            assists: 0,
            deaths: 1,
        }
    }

    #[tokio::test]
    async fn imports_box_score_from_tracker() {
        let l = league().await;
        let c = played_challenge(&l).await;
        l.challenges.force_report(c.id, 20, 10).await.unwrap();

        let tracker = FakeTracker(TrackerGame {
            id: 555,
            players: vec![
                player("Pilot1", TeamColor::Blue, 12),
                player("pilot2", TeamColor::Blue, 8),
                player("pilot10", TeamColor::Orange, 6),
                player("pilot11", TeamColor::Orange, 4),
            ],
        });
        let c = l
            .challenges
            .import_box_score(&tracker, c.id, 555, "ALP")
            .await
            .unwrap();
        assert_eq!(c.tracker_game_id, Some(555));
        assert_eq!(c.stats.len(), 4);
        assert!(c
            .stats
            .iter()
            .any(|s| s.pilot_id == 10 && s.team_id == l.b.id && s.kills == 6));

        let bad = FakeTracker(TrackerGame {
            id: 556,
            players: vec![
                player("pilot1", TeamColor::Blue, 1),
                player("stranger", TeamColor::Blue, 1),
                player("pilot10", TeamColor::Orange, 1),
                player("pilot11", TeamColor::Orange, 1),
            ],
        });
        assert_eq!(
            l.challenges
                .import_box_score(&bad, c.id, 556, "ALP")
                .await
                .unwrap_err(),
            LeagueError::UnknownPilots(vec!["stranger".to_string()])
        );
    }

    #[tokio::test]
    async fn import_lists_unknown_pilots_before_checking_rosters() {
        let l = league().await;
        let c = played_challenge(&l).await;
        l.challenges.force_report(c.id, 20, 10).await.unwrap();

        // pilot10 plays for Bravo, so listing them as blue is unauthorized.
        let players = vec![
            player("pilot1", TeamColor::Blue, 1),
            player("pilot10", TeamColor::Blue, 1),
            player("pilot11", TeamColor::Orange, 1),
            player("Ghost", TeamColor::Orange, 1),
        ];
        let mixed = FakeTracker(TrackerGame {
            id: 557,
            players: players.clone(),
        });
        assert_eq!(
            l.challenges
                .import_box_score(&mixed, c.id, 557, "ALP")
                .await
                .unwrap_err(),
            LeagueError::UnknownPilots(vec!["Ghost".to_string()])
        );

        let known_only = FakeTracker(TrackerGame {
            id: 558,
            players: players[..3].to_vec(),
        });
        assert_eq!(
            l.challenges
                .import_box_score(&known_only, c.id, 558, "ALP")
                .await
                .unwrap_err(),
            LeagueError::PilotNotAuthorized("pilot10".to_string())
        );
    }

    #[tokio::test]
    async fn import_refuses_shared_names_and_absurd_stats() {
        let l = league().await;
        let c = played_challenge(&l).await;
        l.challenges.force_report(c.id, 20, 10).await.unwrap();

        let inflated = FakeTracker(TrackerGame {
            id: 560,
            players: vec![
                player("pilot1", TeamColor::Blue, 4_000_000_000),
                player("pilot2", TeamColor::Blue, 1),
                player("pilot10", TeamColor::Orange, 1),
                player("pilot11", TeamColor::Orange, 1),
            ],
        });
        assert!(matches!(
            l.challenges.import_box_score(&inflated, c.id, 560, "ALP").await,
            Err(LeagueError::InvalidScore(_))
        ));

        l.store
            .save_pilot(&Pilot {
                id: 99,
                name: "PILOT2".into(),
                timezone: None,
            })
            .await
            .unwrap();
        let shared = FakeTracker(TrackerGame {
            id: 559,
            players: vec![
                player("pilot1", TeamColor::Blue, 1),
                player("pilot2", TeamColor::Blue, 1),
                player("pilot10", TeamColor::Orange, 1),
                player("pilot11", TeamColor::Orange, 1),
            ],
        });
        assert_eq!(
            l.challenges
                .import_box_score(&shared, c.id, 559, "ALP")
                .await
                .unwrap_err(),
            LeagueError::AmbiguousPilot("pilot2".to_string())
        );
    }

    #[tokio::test]
    async fn forced_map_is_neutral_unless_a_home_map() {
        let l = league().await;
        let c = agreed_challenge(&l).await;

        let c = l.challenges.force_map(c.id, " wraith ").await.unwrap();
        assert_eq!(c.map.as_deref(), Some("Wraith"));
        assert!(!c.used_neutral_map);

        // Vault is in the pool but belongs to the away team's set.
        let c = l.challenges.force_map(c.id, "Vault").await.unwrap();
        assert_eq!(c.map.as_deref(), Some("Vault"));
        assert!(c.used_neutral_map);
        assert!(c.suggested_map.is_none());

        assert!(matches!(
            l.challenges.force_map(c.id, "Nowhere").await,
            Err(LeagueError::MapNotInPool { .. })
        ));
    }

    #[tokio::test]
    async fn titles_are_trimmed_and_clearable() {
        let l = league().await;
        let c = agreed_challenge(&l).await;

        let c = l
            .challenges
            .set_title(c.id, Some("  Grand Final ".into()))
            .await
            .unwrap();
        assert_eq!(c.title.as_deref(), Some("Grand Final"));

        let c = l.challenges.set_title(c.id, Some("   ".into())).await.unwrap();
        assert!(c.title.is_none());

        l.challenges.set_title(c.id, Some("Week 3".into())).await.unwrap();
        let c = l.challenges.set_title(c.id, None).await.unwrap();
        assert!(c.title.is_none());
        assert!(l.challenges.get_challenge(c.id).await.unwrap().title.is_none());
    }

    #[tokio::test]
    async fn clearing_stats_drops_box_score_and_tracker_link() {
        let l = league().await;
        let c = played_challenge(&l).await;
        l.challenges.force_report(c.id, 20, 10).await.unwrap();

        let tracker = FakeTracker(TrackerGame {
            id: 777,
            players: vec![
                player("pilot1", TeamColor::Blue, 3),
                player("pilot2", TeamColor::Blue, 3),
                player("pilot10", TeamColor::Orange, 3),
                player("pilot11", TeamColor::Orange, 3),
            ],
        });
        l.challenges
            .import_box_score(&tracker, c.id, 777, "ALP")
            .await
            .unwrap();

        let c = l.challenges.clear_stats(c.id).await.unwrap();
        assert!(c.stats.is_empty());
        assert_eq!(c.tracker_game_id, None);

        let stored = l.challenges.get_challenge(c.id).await.unwrap();
        assert!(stored.stats.is_empty());
        assert!(stored.report.is_some());
    }

    #[tokio::test]
    async fn suggested_time_falls_back_to_team_timezone() {
        let l = league().await;
        let c = agreed_challenge(&l).await;
        l.teams.set_team_timezone(1, "America/New_York").await.unwrap();

        // The founder has no timezone of their own, so Alpha's applies (UTC-5 in January).
        let founder = l.teams.get_pilot(1).await.unwrap().unwrap();
        let c = l
            .challenges
            .suggest_time(&founder, c.id, "2099-01-15 20:00")
            .await
            .unwrap();
        let expected: DateTime<Utc> = "2099-01-16T01:00:00Z".parse().unwrap();
        assert_eq!(c.suggested_time.as_ref().map(|s| s.value), Some(expected));

        // A captain's own timezone wins over the team's.
        let p2 = l.teams.get_pilot(2).await.unwrap().unwrap();
        l.teams.make_captain(1, &p2).await.unwrap();
        let p2 = l.teams.set_pilot_timezone(&p2, "Europe/London").await.unwrap();
        let c = l
            .challenges
            .suggest_time(&p2, c.id, "2099-01-15 20:00")
            .await
            .unwrap();
        let expected: DateTime<Utc> = "2099-01-15T20:00:00Z".parse().unwrap();
        assert_eq!(c.suggested_time.as_ref().map(|s| s.value), Some(expected));
    }

    #[tokio::test]
    async fn admin_created_postseason_match() {
        let l = league().await;
        l.store
            .save_season(&SeasonState {
                number: 1,
                postseason: true,
            })
            .await
            .unwrap();
        let c = l
            .challenges
            .admin_create_challenge("ALP", "BRV", GameType::CaptureTheFlag)
            .await
            .unwrap();
        assert!(c.postseason);
        assert_eq!(c.home_map_team, l.a.id);
        assert_eq!(c.challenging_team, l.b.id);

        assert_eq!(
            l.challenges.clock(1, c.id).await.unwrap_err(),
            LeagueError::Postseason
        );
    }
}
