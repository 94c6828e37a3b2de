// Box scores imported from the external match tracker.
//
// The tracker knows players by in-game name and side colour only. Mapping
// them onto league pilots and teams happens here so the HTTP client stays a
// dumb fetcher.

use crate::core::league::{validation, LeagueError, StatLine};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamColor {
    Blue,
    Orange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerPlayer {
    pub name: String,
    pub team: TeamColor,
    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerGame {
    pub id: u64,
    pub players: Vec<TrackerPlayer>,
}

/// Port for fetching completed games from the tracker.
#[async_trait]
pub trait TrackerClient: Send + Sync {
    async fn fetch_game(&self, game_id: u64) -> Result<TrackerGame, LeagueError>;
}

/// A tracker player resolved to a league pilot.
#[derive(Debug, Clone)]
pub struct ResolvedPlayer {
    pub pilot_id: u64,
    pub pilot_name: String,
    pub team_id: u64,
    pub player: TrackerPlayer,
}

/// Turn resolved players into stat lines, checking each side fielded the
/// agreed number of pilots.
pub fn build_stat_lines(
    players: &[ResolvedPlayer],
    blue_team: u64,
    orange_team: u64,
    players_per_side: usize,
) -> Result<Vec<StatLine>, LeagueError> {
    for (label, team_id) in [("Blue", blue_team), ("Orange", orange_team)] {
        let count = players.iter().filter(|p| p.team_id == team_id).count();
        if count != players_per_side {
            return Err(LeagueError::BoxScoreMismatch(format!(
                "{} has {} players in the tracker game, but the match was {}v{}.",
                label, count, players_per_side, players_per_side
            )));
        }
    }

    let mut seen = Vec::with_capacity(players.len());
    for p in players {
        validation::valid_stat_line(p.player.kills, p.player.assists, p.player.deaths)?;
        if seen.contains(&p.pilot_id) {
            return Err(LeagueError::BoxScoreMismatch(format!(
                "{} appears more than once in the tracker game.",
                p.pilot_name
            )));
        }
        seen.push(p.pilot_id);
    }

    Ok(players
        .iter()
        .map(|p| StatLine {
            pilot_id: p.pilot_id,
            team_id: p.team_id,
            kills: p.player.kills,
            assists: p.player.assists,
            deaths: p.player.deaths,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(pilot_id: u64, team_id: u64, kills: u32) -> ResolvedPlayer {
        ResolvedPlayer {
            pilot_id,
            pilot_name: format!("pilot{}", pilot_id),
            team_id,
            player: TrackerPlayer {
                name: format!("pilot{}", pilot_id),
                team: if team_id == 1 {
                    TeamColor::Blue
                } else {
                    TeamColor::Orange
                },
                kills,
                assists: 1,
                deaths: 2,
            },
        }
    }

    #[test]
    fn builds_lines_for_full_sides() {
        let players = vec![
            resolved(10, 1, 5),
            resolved(11, 1, 3),
            resolved(20, 2, 7),
            resolved(21, 2, 0),
        ];
        let lines = build_stat_lines(&players, 1, 2, 2).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2].kills, 7);
        assert_eq!(lines[2].team_id, 2);
    }

    #[test]
    fn rejects_short_sides() {
        let players = vec![resolved(10, 1, 5), resolved(20, 2, 7), resolved(21, 2, 0)];
        assert!(matches!(
            build_stat_lines(&players, 1, 2, 2),
            Err(LeagueError::BoxScoreMismatch(_))
        ));
    }

    #[test]
    fn rejects_duplicate_pilots() {
        let players = vec![
            resolved(10, 1, 5),
            resolved(10, 1, 3),
            resolved(20, 2, 7),
            resolved(21, 2, 0),
        ];
        assert!(matches!(
            build_stat_lines(&players, 1, 2, 2),
            Err(LeagueError::BoxScoreMismatch(_))
        ));
    }
}
