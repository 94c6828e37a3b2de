// Teams - founding, rosters, leadership and home maps.

mod team_service;

pub use team_service::{DisbandOutcome, RosterEntry, TeamService};
