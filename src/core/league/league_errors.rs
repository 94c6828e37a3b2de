// Every way a league command can be refused.
//
// Almost every variant is a *warning*: an expected rule violation that the
// Discord layer shows to the user as-is. `Storage` is the only internal
// failure and covers database, tracker and cloud-control errors alike.

use super::league_models::{GameType, TeamSize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LeagueError {
    // ---- pilots & teams ----
    #[error("You are not on a team.")]
    NotOnTeam,

    #[error("{0} is already on a team.")]
    AlreadyOnTeam(String),

    #[error("{0} is not on your team.")]
    PilotNotOnTeam(String),

    #[error("Only the team founder can do that.")]
    NotFounder,

    #[error("Only a team founder or captain can do that.")]
    NotCaptain,

    #[error("Team `{0}` was not found.")]
    TeamNotFound(String),

    #[error("Pilot `{0}` was not found.")]
    PilotNotFound(String),

    #[error("{0} has been disbanded.")]
    TeamDisbanded(String),

    #[error("{0} is not disbanded.")]
    TeamNotDisbanded(String),

    #[error("The roster of {0} is locked.")]
    TeamLocked(String),

    #[error("{0}")]
    InvalidTeamName(String),

    #[error("{0}")]
    InvalidTeamTag(String),

    #[error("A team named or tagged `{0}` already exists.")]
    NameTaken(String),

    #[error("Rosters are limited to {max} pilots (including pending invites).")]
    RosterFull { max: usize },

    #[error("{team} needs at least {required} pilots on its roster.")]
    RosterTooSmall { team: String, required: usize },

    #[error("Teams may have at most {max} captains.")]
    CaptainLimit { max: usize },

    #[error("{0} is already a captain.")]
    AlreadyCaptain(String),

    #[error("{0} is not a captain.")]
    NotACaptain(String),

    #[error("Captains may only remove pilots, not the founder or other captains.")]
    CannotRemoveLeader,

    #[error("{0} has already been invited.")]
    AlreadyInvited(String),

    #[error("You have no invitation from {0}.")]
    NotInvited(String),

    #[error("The founder cannot leave the team. Transfer the team or disband it instead.")]
    FounderCannotLeave,

    #[error("You cannot target yourself with that command.")]
    CannotTargetSelf,

    #[error("`{0}` is not a valid timezone. Use an IANA name like `America/New_York`.")]
    InvalidTimezone(String),

    // ---- maps ----
    #[error("`{map}` is not in the {game_type} map pool.")]
    MapNotInPool { map: String, game_type: GameType },

    #[error("`{0}` is already in the map pool.")]
    MapAlreadyInPool(String),

    #[error("Map names cannot be empty.")]
    EmptyMapName,

    #[error("`{0}` is one of the home team's home maps and cannot be a neutral map.")]
    MapIsHomeMap(String),

    #[error("{team} has not set {count} home maps for {game_type} {team_size}.")]
    HomeMapsMissing {
        team: String,
        game_type: GameType,
        team_size: TeamSize,
        count: usize,
    },

    #[error("{team} has not set any {game_type} home maps.")]
    NoHomeMaps { team: String, game_type: GameType },

    #[error("{0}")]
    InvalidHomeMaps(String),

    #[error("Home maps cannot change while challenge #{0} is waiting on a map pick.")]
    HomeMapsLocked(u64),

    #[error("Pick a map option between 1 and {max}.")]
    InvalidMapOption { max: usize },

    // ---- challenges ----
    #[error("Challenge #{0} was not found.")]
    ChallengeNotFound(u64),

    #[error("You cannot challenge your own team.")]
    SameTeam,

    #[error("Your team is not part of challenge #{0}.")]
    NotParticipant(u64),

    #[error("There is already an open {game_type} challenge between these teams (#{id}).")]
    OpenChallengeExists { id: u64, game_type: GameType },

    #[error("Challenge #{0} has been voided.")]
    ChallengeVoided(u64),

    #[error("Challenge #{0} has already been confirmed.")]
    ChallengeConfirmed(u64),

    #[error("Challenge #{0} has not been confirmed yet.")]
    ChallengeNotConfirmed(u64),

    #[error("Challenge #{0} already has a confirmed match time.")]
    AlreadyScheduled(u64),

    #[error("Challenge #{0} does not have a confirmed match time.")]
    NotScheduled(u64),

    #[error("Challenge #{0} has already been reported.")]
    AlreadyReported(u64),

    #[error("The team size for challenge #{0} has not been set.")]
    TeamSizeNotSet(u64),

    #[error("The map for challenge #{0} has not been set.")]
    MapNotSet(u64),

    #[error("Only the away team may pick from the home team's maps.")]
    NotAwayTeam,

    #[error("There is no pending {0} suggestion to confirm.")]
    NothingToConfirm(&'static str),

    #[error("Your own team suggested that {0}. The other team must confirm it.")]
    OwnSuggestion(&'static str),

    #[error("{0}")]
    InvalidTime(String),

    #[error("That time is in the past.")]
    TimeInPast,

    #[error("The match time must be on or before the clock deadline ({0}).")]
    PastClockDeadline(String),

    #[error("This match has not been played yet.")]
    MatchNotPlayed,

    #[error("{0}")]
    InvalidScore(String),

    #[error("Challenge #{0} has no pending report.")]
    NoReport(u64),

    #[error("Your team reported this match. The other team must confirm it.")]
    OwnReport,

    #[error("Challenge #{0} is already clocked.")]
    AlreadyClocked(u64),

    #[error("Challenge #{0} is not clocked.")]
    NotClocked(u64),

    #[error("Your team has used all {limit} clocks for this season.")]
    ClockLimit { limit: u32 },

    #[error("{0} is penalized and cannot do that.")]
    Penalized(String),

    #[error("That is not available during the postseason.")]
    Postseason,

    #[error("Rematches are only available for confirmed matches that ended in a tie.")]
    RematchNotAllowed,

    #[error("Your team has already requested a rematch.")]
    RematchAlreadyRequested,

    #[error("Challenge #{0} already has a caster.")]
    CasterTaken(u64),

    #[error("You are not casting challenge #{0}.")]
    NotCaster(u64),

    #[error("Pilots on either team cannot cast their own match.")]
    CasterOnTeam,

    #[error("{0} is not authorized to play for that team in this match.")]
    PilotNotAuthorized(String),

    #[error("More than one pilot is named `{0}`. Add their stats with `/admin addstat` instead.")]
    AmbiguousPilot(String),

    #[error("Unknown pilots in the box score: {}", .0.join(", "))]
    UnknownPilots(Vec<String>),

    #[error("{0}")]
    BoxScoreMismatch(String),

    // ---- servers ----
    #[error("There is no game server named `{0}`.")]
    UnknownServer(String),

    #[error("Server `{0}` is already running.")]
    ServerRunning(String),

    #[error("Server `{0}` is not running.")]
    ServerNotRunning(String),

    #[error("Game server control is not configured.")]
    ServersDisabled,

    // ---- internal ----
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LeagueError {
    /// Warnings are expected rule violations shown directly to the user.
    pub fn is_warning(&self) -> bool {
        !matches!(self, LeagueError::Storage(_))
    }
}

impl From<serde_json::Error> for LeagueError {
    fn from(e: serde_json::Error) -> Self {
        LeagueError::Storage(e.to_string())
    }
}
