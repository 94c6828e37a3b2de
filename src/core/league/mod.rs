// League module - shared domain types, errors and the validation chain that
// every team and challenge command runs through.

mod league_config;
mod league_errors;
pub mod league_models;
mod league_store;
pub mod match_time;
pub mod validation;

pub use league_config::LeagueConfig;
pub use league_errors::LeagueError;
pub use league_models::{
    AuthorizedPilot, Challenge, ChallengeState, Clock, GameType, HomeMapSet, Pilot, Report,
    SeasonState, StatLine, Suggestion, Team, TeamMember, TeamRole, TeamSize, Void,
};
pub use league_store::{ChallengeStore, LeagueStore, SettingsStore, TeamStore};
pub use match_time::{format_match_time, parse_match_time, valid_timezone};
