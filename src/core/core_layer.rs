// The core module contains all business logic.
// Each feature gets its own submodule; none of them know about Discord.

#[path = "league/mod.rs"]
pub mod league;

#[path = "teams/mod.rs"]
pub mod teams;

#[path = "challenges/mod.rs"]
pub mod challenges;

#[path = "season/season_service.rs"]
pub mod season;

#[path = "standings/standings_service.rs"]
pub mod standings;

#[path = "servers/server_service.rs"]
pub mod servers;
