// Discord layer - slash commands, reply formatting and the framework hooks.
//
// Nothing in here decides league rules. Commands turn Discord types into
// ids and strings, call a core service, and render the result.

#[path = "commands/command_catalog.rs"]
pub mod commands;

pub mod announcements;
pub mod command_gate;
pub mod error_handler;
pub mod formatter;

use crate::core::challenges::{ChallengeService, TrackerClient};
use crate::core::season::SeasonService;
use crate::core::servers::ServerService;
use crate::core::standings::StandingsService;
use crate::core::teams::TeamService;
use crate::infra::league::SqliteLeagueStore;
use command_gate::CommandGate;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Store backing every service in production.
pub type Store = SqliteLeagueStore;

/// Shared state handed to every command.
pub struct Data {
    pub teams: Arc<TeamService<Store>>,
    pub challenges: Arc<ChallengeService<Store>>,
    pub season: Arc<SeasonService<Store>>,
    pub standings: Arc<StandingsService<Store>>,
    /// `None` when no cloud control endpoint is configured.
    pub servers: Option<Arc<ServerService>>,
    pub tracker: Arc<dyn TrackerClient>,
    pub gate: CommandGate,
    pub announce_channel: Option<u64>,
}
