// Read-only league views: map pool, standings, pilot stats and schedule.

use super::helpers::{challenge_label, reply, viewer_timezone};
use crate::core::league::GameType;
use crate::discord::formatter;
use crate::discord::{Context, Error};
use chrono::Utc;

const STATS_LIMIT: usize = 20;

/// Show the map pool for every game type.
#[poise::command(slash_command, guild_only)]
pub async fn maps(ctx: Context<'_>) -> Result<(), Error> {
    let mut pools = Vec::with_capacity(GameType::ALL.len());
    for game_type in GameType::ALL {
        pools.push((game_type, ctx.data().season.maps(game_type).await?));
    }
    reply(ctx, formatter::maps_embed(&pools)).await
}

/// Show the standings for a season (defaults to the current one).
#[poise::command(slash_command, guild_only)]
pub async fn standings(
    ctx: Context<'_>,
    #[description = "Season number"] season: Option<u32>,
) -> Result<(), Error> {
    let season = match season {
        Some(number) => number,
        None => ctx.data().season.current().await?.number,
    };
    let records = ctx.data().standings.standings(season).await?;
    reply(ctx, formatter::standings_embed(season, &records)).await
}

/// Show the top pilots by KDA for a season.
#[poise::command(slash_command, guild_only)]
pub async fn stats(
    ctx: Context<'_>,
    #[description = "Season number"] season: Option<u32>,
) -> Result<(), Error> {
    let season = match season {
        Some(number) => number,
        None => ctx.data().season.current().await?.number,
    };
    let stats = ctx.data().standings.pilot_stats(season).await?;
    reply(ctx, formatter::pilot_stats_embed(season, &stats, STATS_LIMIT)).await
}

/// Show upcoming matches in your timezone.
#[poise::command(slash_command, guild_only)]
pub async fn schedule(ctx: Context<'_>) -> Result<(), Error> {
    let upcoming = ctx.data().challenges.upcoming_matches(Utc::now()).await?;
    let mut entries = Vec::with_capacity(upcoming.len());
    for challenge in &upcoming {
        if let Some(time) = challenge.match_time {
            let mut label = challenge_label(ctx, challenge).await?;
            if let Some(caster) = challenge.caster {
                label.push_str(&format!(" 🎙️ <@{}>", caster));
            }
            entries.push((label, time));
        }
    }
    let timezone = viewer_timezone(ctx).await;
    reply(ctx, formatter::schedule_embed(&entries, timezone.as_deref())).await
}
