// League domain models - teams, pilots, challenges and season state.
//
// These are pure domain types with no Discord dependencies. Ids are the raw
// u64 snowflakes for pilots and store-assigned u64s for teams/challenges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// GAME SETTINGS
// ============================================================================

/// The two game modes the league plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    TeamAnarchy,
    CaptureTheFlag,
}

impl GameType {
    pub const ALL: [GameType; 2] = [GameType::TeamAnarchy, GameType::CaptureTheFlag];

    /// Short code used in commands and the database.
    pub fn code(&self) -> &'static str {
        match self {
            GameType::TeamAnarchy => "TA",
            GameType::CaptureTheFlag => "CTF",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::TeamAnarchy => write!(f, "Team Anarchy"),
            GameType::CaptureTheFlag => write!(f, "Capture the Flag"),
        }
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "").as_str() {
            "ta" | "teamanarchy" => Ok(GameType::TeamAnarchy),
            "ctf" | "capturetheflag" => Ok(GameType::CaptureTheFlag),
            other => Err(format!("Unknown game type `{}`. Use TA or CTF.", other)),
        }
    }
}

/// How many pilots each side fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamSize {
    TwoVTwo,
    ThreeVThree,
    FourVFour,
}

impl TeamSize {
    pub const ALL: [TeamSize; 3] = [TeamSize::TwoVTwo, TeamSize::ThreeVThree, TeamSize::FourVFour];

    pub fn players(&self) -> usize {
        match self {
            TeamSize::TwoVTwo => 2,
            TeamSize::ThreeVThree => 3,
            TeamSize::FourVFour => 4,
        }
    }

    pub fn from_players(players: usize) -> Option<Self> {
        match players {
            2 => Some(TeamSize::TwoVTwo),
            3 => Some(TeamSize::ThreeVThree),
            4 => Some(TeamSize::FourVFour),
            _ => None,
        }
    }
}

impl fmt::Display for TeamSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.players();
        write!(f, "{}v{}", n, n)
    }
}

impl FromStr for TeamSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let first = normalized.split('v').next().unwrap_or_default();
        first
            .parse::<usize>()
            .ok()
            .and_then(TeamSize::from_players)
            .ok_or_else(|| format!("Unknown team size `{}`. Use 2v2, 3v3 or 4v4.", s.trim()))
    }
}

// ============================================================================
// PILOTS AND TEAMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamRole {
    Founder,
    Captain,
    Pilot,
}

impl TeamRole {
    /// Founders and captains may run team-management and challenge commands.
    pub fn is_leader(&self) -> bool {
        matches!(self, TeamRole::Founder | TeamRole::Captain)
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamRole::Founder => write!(f, "Founder"),
            TeamRole::Captain => write!(f, "Captain"),
            TeamRole::Pilot => write!(f, "Pilot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    /// Discord user id.
    pub id: u64,
    pub name: String,
    /// IANA timezone name used to interpret times this pilot types in.
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub pilot_id: u64,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

/// A team's registered home maps for one game type and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeMapSet {
    pub game_type: GameType,
    pub team_size: TeamSize,
    pub maps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
    pub tag: String,
    pub members: Vec<TeamMember>,
    /// Pilots with an outstanding invitation.
    pub invites: Vec<u64>,
    pub home_maps: Vec<HomeMapSet>,
    pub timezone: Option<String>,
    pub penalties: u32,
    pub locked: bool,
    pub disbanded: bool,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn new(name: String, tag: String, founder: u64, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name,
            tag,
            members: vec![TeamMember {
                pilot_id: founder,
                role: TeamRole::Founder,
                joined_at: now,
            }],
            invites: Vec::new(),
            home_maps: Vec::new(),
            timezone: None,
            penalties: 0,
            locked: false,
            disbanded: false,
            created_at: now,
        }
    }

    pub fn member(&self, pilot_id: u64) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.pilot_id == pilot_id)
    }

    pub fn member_mut(&mut self, pilot_id: u64) -> Option<&mut TeamMember> {
        self.members.iter_mut().find(|m| m.pilot_id == pilot_id)
    }

    pub fn role_of(&self, pilot_id: u64) -> Option<TeamRole> {
        self.member(pilot_id).map(|m| m.role)
    }

    pub fn founder(&self) -> Option<u64> {
        self.members
            .iter()
            .find(|m| m.role == TeamRole::Founder)
            .map(|m| m.pilot_id)
    }

    pub fn captain_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.role == TeamRole::Captain)
            .count()
    }

    pub fn is_invited(&self, pilot_id: u64) -> bool {
        self.invites.contains(&pilot_id)
    }

    pub fn home_map_set(&self, game_type: GameType, team_size: TeamSize) -> Option<&HomeMapSet> {
        self.home_maps
            .iter()
            .find(|set| set.game_type == game_type && set.team_size == team_size)
    }

    /// `[TAG] Name`, used everywhere a team is displayed.
    pub fn display_name(&self) -> String {
        format!("[{}] {}", self.tag, self.name)
    }
}

// ============================================================================
// CHALLENGES
// ============================================================================

/// A value proposed by one team that the other team must confirm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion<T> {
    pub value: T,
    pub team: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    pub team: u64,
    pub clocked_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub reporting_team: u64,
    pub challenging_score: u32,
    pub challenged_score: u32,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Void {
    pub at: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedPilot {
    pub pilot_id: u64,
    pub team_id: u64,
}

/// One pilot's line in a game's box score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub pilot_id: u64,
    pub team_id: u64,
    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
}

/// Where a challenge sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    Unscheduled,
    TimeSuggested,
    Scheduled,
    Reported,
    Confirmed,
    Rematched,
    Voided,
}

impl fmt::Display for ChallengeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChallengeState::Unscheduled => "Unscheduled",
            ChallengeState::TimeSuggested => "Time suggested",
            ChallengeState::Scheduled => "Scheduled",
            ChallengeState::Reported => "Reported",
            ChallengeState::Confirmed => "Confirmed",
            ChallengeState::Rematched => "Rematched",
            ChallengeState::Voided => "Voided",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u64,
    pub season: u32,
    pub challenging_team: u64,
    pub challenged_team: u64,
    pub game_type: GameType,
    pub home_map_team: u64,
    pub postseason: bool,

    pub team_size: Option<TeamSize>,
    pub suggested_team_size: Option<Suggestion<TeamSize>>,
    pub map: Option<String>,
    pub used_neutral_map: bool,
    pub suggested_map: Option<Suggestion<String>>,
    pub match_time: Option<DateTime<Utc>>,
    pub suggested_time: Option<Suggestion<DateTime<Utc>>>,

    pub clock: Option<Clock>,
    pub report: Option<Report>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub voided: Option<Void>,
    pub rematch_requested_by: Option<u64>,
    pub rematch_challenge: Option<u64>,

    pub title: Option<String>,
    pub caster: Option<u64>,

    pub authorized_pilots: Vec<AuthorizedPilot>,
    pub stats: Vec<StatLine>,
    pub tracker_game_id: Option<u64>,

    pub created_at: DateTime<Utc>,
}

impl Challenge {
    pub fn new(
        season: u32,
        challenging_team: u64,
        challenged_team: u64,
        game_type: GameType,
        home_map_team: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            season,
            challenging_team,
            challenged_team,
            game_type,
            home_map_team,
            postseason: false,
            team_size: None,
            suggested_team_size: None,
            map: None,
            used_neutral_map: false,
            suggested_map: None,
            match_time: None,
            suggested_time: None,
            clock: None,
            report: None,
            confirmed_at: None,
            voided: None,
            rematch_requested_by: None,
            rematch_challenge: None,
            title: None,
            caster: None,
            authorized_pilots: Vec::new(),
            stats: Vec::new(),
            tracker_game_id: None,
            created_at: now,
        }
    }

    pub fn state(&self) -> ChallengeState {
        if self.voided.is_some() {
            ChallengeState::Voided
        } else if self.rematch_challenge.is_some() {
            ChallengeState::Rematched
        } else if self.confirmed_at.is_some() {
            ChallengeState::Confirmed
        } else if self.report.is_some() {
            ChallengeState::Reported
        } else if self.match_time.is_some() {
            ChallengeState::Scheduled
        } else if self.suggested_time.is_some() {
            ChallengeState::TimeSuggested
        } else {
            ChallengeState::Unscheduled
        }
    }

    /// Open challenges are neither voided nor confirmed.
    pub fn is_open(&self) -> bool {
        self.voided.is_none() && self.confirmed_at.is_none()
    }

    pub fn involves(&self, team_id: u64) -> bool {
        self.challenging_team == team_id || self.challenged_team == team_id
    }

    /// The other participant, if `team_id` is one of the two teams.
    pub fn opponent_of(&self, team_id: u64) -> Option<u64> {
        if team_id == self.challenging_team {
            Some(self.challenged_team)
        } else if team_id == self.challenged_team {
            Some(self.challenging_team)
        } else {
            None
        }
    }

    /// The team that picks from the home team's maps.
    pub fn away_team(&self) -> u64 {
        if self.home_map_team == self.challenging_team {
            self.challenged_team
        } else {
            self.challenging_team
        }
    }

    /// Score for `team_id` from a confirmed or pending report.
    pub fn score_for(&self, team_id: u64) -> Option<u32> {
        let report = self.report.as_ref()?;
        if team_id == self.challenging_team {
            Some(report.challenging_score)
        } else if team_id == self.challenged_team {
            Some(report.challenged_score)
        } else {
            None
        }
    }

    pub fn is_tie(&self) -> bool {
        self.report
            .as_ref()
            .map(|r| r.challenging_score == r.challenged_score)
            .unwrap_or(false)
    }

    pub fn winner(&self) -> Option<u64> {
        let report = self.report.as_ref()?;
        if report.challenging_score > report.challenged_score {
            Some(self.challenging_team)
        } else if report.challenged_score > report.challenging_score {
            Some(self.challenged_team)
        } else {
            None
        }
    }

    pub fn is_authorized(&self, pilot_id: u64, team_id: u64) -> bool {
        self.authorized_pilots
            .iter()
            .any(|a| a.pilot_id == pilot_id && a.team_id == team_id)
    }
}

// ============================================================================
// SEASON
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonState {
    pub number: u32,
    pub postseason: bool,
}

impl Default for SeasonState {
    fn default() -> Self {
        Self {
            number: 1,
            postseason: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> Challenge {
        Challenge::new(1, 10, 20, GameType::TeamAnarchy, 20, Utc::now())
    }

    #[test]
    fn parses_game_types() {
        assert_eq!("ta".parse::<GameType>().unwrap(), GameType::TeamAnarchy);
        assert_eq!(
            "Capture the Flag".parse::<GameType>().unwrap(),
            GameType::CaptureTheFlag
        );
        assert!("ffa".parse::<GameType>().is_err());
    }

    #[test]
    fn parses_team_sizes() {
        assert_eq!("3v3".parse::<TeamSize>().unwrap(), TeamSize::ThreeVThree);
        assert_eq!("4".parse::<TeamSize>().unwrap(), TeamSize::FourVFour);
        assert!("5v5".parse::<TeamSize>().is_err());
        assert_eq!(TeamSize::TwoVTwo.to_string(), "2v2");
    }

    #[test]
    fn state_follows_lifecycle() {
        let mut c = challenge();
        assert_eq!(c.state(), ChallengeState::Unscheduled);

        c.suggested_time = Some(Suggestion {
            value: Utc::now(),
            team: 10,
        });
        assert_eq!(c.state(), ChallengeState::TimeSuggested);

        c.match_time = Some(Utc::now());
        assert_eq!(c.state(), ChallengeState::Scheduled);

        c.report = Some(Report {
            reporting_team: 10,
            challenging_score: 10,
            challenged_score: 20,
            reported_at: Utc::now(),
        });
        assert_eq!(c.state(), ChallengeState::Reported);
        assert_eq!(c.winner(), Some(20));

        c.confirmed_at = Some(Utc::now());
        assert_eq!(c.state(), ChallengeState::Confirmed);
        assert!(!c.is_open());

        c.voided = Some(Void {
            at: Utc::now(),
            reason: "test".to_string(),
        });
        assert_eq!(c.state(), ChallengeState::Voided);
    }

    #[test]
    fn away_team_is_the_non_home_team() {
        let c = challenge();
        assert_eq!(c.away_team(), 10);
        assert_eq!(c.opponent_of(10), Some(20));
        assert_eq!(c.opponent_of(30), None);
    }
}
