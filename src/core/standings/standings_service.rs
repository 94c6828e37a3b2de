// Season standings and pilot leaderboards.
//
// Only confirmed, non-voided regular-season challenges count. Aggregation is
// done by pure functions so the ordering rules can be tested without a store.
// Totals saturate: rows written before score limits existed must not take
// the standings down.

use crate::core::league::{Challenge, LeagueError, LeagueStore, Team};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub team_id: u64,
    pub name: String,
    pub tag: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl TeamRecord {
    fn empty(team: &Team) -> Self {
        Self {
            team_id: team.id,
            name: team.name.clone(),
            tag: team.tag.clone(),
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0,
            points_against: 0,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins.saturating_add(self.losses).saturating_add(self.ties)
    }

    /// Ties count as half a win.
    pub fn win_percentage(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => (self.wins as f64 + self.ties as f64 / 2.0) / games as f64,
        }
    }

    pub fn point_differential(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PilotStats {
    pub pilot_id: u64,
    pub name: String,
    pub games: u32,
    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
}

impl PilotStats {
    pub fn kda(&self) -> f64 {
        (self.kills as f64 + self.assists as f64) / self.deaths.max(1) as f64
    }
}

// =============================================================================
// AGGREGATION
// =============================================================================

fn counts_for_standings(challenge: &Challenge, season: u32) -> bool {
    challenge.season == season
        && !challenge.postseason
        && challenge.voided.is_none()
        && challenge.confirmed_at.is_some()
        && challenge.report.is_some()
}

/// Build records for every active team plus any team that played.
pub fn compute_standings(teams: &[Team], challenges: &[Challenge], season: u32) -> Vec<TeamRecord> {
    let by_id: HashMap<u64, &Team> = teams.iter().map(|t| (t.id, t)).collect();
    let mut records: HashMap<u64, TeamRecord> = teams
        .iter()
        .filter(|t| !t.disbanded)
        .map(|t| (t.id, TeamRecord::empty(t)))
        .collect();

    for challenge in challenges.iter().filter(|c| counts_for_standings(c, season)) {
        for (team_id, opponent_id) in [
            (challenge.challenging_team, challenge.challenged_team),
            (challenge.challenged_team, challenge.challenging_team),
        ] {
            let (Some(own), Some(opp)) = (challenge.score_for(team_id), challenge.score_for(opponent_id)) else {
                continue;
            };
            let Some(team) = by_id.get(&team_id) else {
                continue;
            };
            let record = records
                .entry(team_id)
                .or_insert_with(|| TeamRecord::empty(team));
            match own.cmp(&opp) {
                Ordering::Greater => record.wins = record.wins.saturating_add(1),
                Ordering::Less => record.losses = record.losses.saturating_add(1),
                Ordering::Equal => record.ties = record.ties.saturating_add(1),
            }
            record.points_for = record.points_for.saturating_add(own);
            record.points_against = record.points_against.saturating_add(opp);
        }
    }

    let mut standings: Vec<TeamRecord> = records.into_values().collect();
    standings.sort_by(|a, b| {
        b.win_percentage()
            .total_cmp(&a.win_percentage())
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| b.point_differential().cmp(&a.point_differential()))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    standings
}

/// Sum stat lines per pilot. Names come from `names`, falling back to the id.
pub fn compute_pilot_stats(
    challenges: &[Challenge],
    season: u32,
    names: &HashMap<u64, String>,
) -> Vec<PilotStats> {
    let mut totals: HashMap<u64, PilotStats> = HashMap::new();
    for challenge in challenges
        .iter()
        .filter(|c| c.season == season && c.voided.is_none() && c.confirmed_at.is_some())
    {
        for line in &challenge.stats {
            let entry = totals.entry(line.pilot_id).or_insert_with(|| PilotStats {
                pilot_id: line.pilot_id,
                name: names
                    .get(&line.pilot_id)
                    .cloned()
                    .unwrap_or_else(|| line.pilot_id.to_string()),
                games: 0,
                kills: 0,
                assists: 0,
                deaths: 0,
            });
            entry.games = entry.games.saturating_add(1);
            entry.kills = entry.kills.saturating_add(line.kills);
            entry.assists = entry.assists.saturating_add(line.assists);
            entry.deaths = entry.deaths.saturating_add(line.deaths);
        }
    }

    let mut stats: Vec<PilotStats> = totals.into_values().collect();
    stats.sort_by(|a, b| {
        b.kda()
            .total_cmp(&a.kda())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    stats
}

// =============================================================================
// SERVICE
// =============================================================================

pub struct StandingsService<S: LeagueStore> {
    store: Arc<S>,
}

impl<S: LeagueStore> StandingsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn standings(&self, season: u32) -> Result<Vec<TeamRecord>, LeagueError> {
        let teams = self.store.list_teams().await?;
        let challenges = self.store.list_challenges_for_season(season).await?;
        Ok(compute_standings(&teams, &challenges, season))
    }

    pub async fn team_record(&self, team: &Team, season: u32) -> Result<TeamRecord, LeagueError> {
        let challenges = self.store.list_challenges_for_team(team.id).await?;
        Ok(compute_standings(std::slice::from_ref(team), &challenges, season)
            .into_iter()
            .find(|r| r.team_id == team.id)
            .unwrap_or_else(|| TeamRecord::empty(team)))
    }

    pub async fn pilot_stats(&self, season: u32) -> Result<Vec<PilotStats>, LeagueError> {
        let challenges = self.store.list_challenges_for_season(season).await?;
        let mut names = HashMap::new();
        for line in challenges.iter().flat_map(|c| c.stats.iter()) {
            if names.contains_key(&line.pilot_id) {
                continue;
            }
            if let Some(pilot) = self.store.get_pilot(line.pilot_id).await? {
                names.insert(pilot.id, pilot.name);
            }
        }
        Ok(compute_pilot_stats(&challenges, season, &names))
    }
}
