// Discord commands module.
// Each command group gets its own file.

mod helpers;

pub mod admin;
pub mod challenge;
pub mod league;
pub mod pilot;
pub mod presence;
pub mod server;
pub mod team;

use crate::discord::{Data, Error};

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        team::team(),
        pilot::pilot(),
        challenge::challenge(),
        admin::admin(),
        league::maps(),
        league::standings(),
        league::stats(),
        league::schedule(),
        server::server(),
    ]
}
