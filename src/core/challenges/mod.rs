// Challenges - the match lifecycle between two teams, from the first
// challenge through scheduling, reporting and the imported box score.

pub mod box_score;
mod challenge_service;

pub use box_score::{TeamColor, TrackerClient, TrackerGame, TrackerPlayer};
pub use challenge_service::{ChallengeService, RematchOutcome};
