// Bot presence. The status line shows which part of the season is running.

use crate::core::league::SeasonState;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

fn season_activity(season: &SeasonState) -> serenity::ActivityData {
    if season.postseason {
        serenity::ActivityData::watching(format!("Season {} playoffs", season.number))
    } else {
        serenity::ActivityData::watching(format!("Season {}", season.number))
    }
}

/// Show the given season in the bot's status.
pub fn show_season(ctx: &serenity::Context, season: &SeasonState) {
    ctx.set_presence(Some(season_activity(season)), serenity::OnlineStatus::Online);
}

/// Called once the bot is ready.
pub async fn on_ready(ctx: &serenity::Context, data: &Data) {
    match data.season.current().await {
        Ok(season) => show_season(ctx, &season),
        Err(e) => {
            tracing::warn!("Could not load the season for presence: {}", e);
            let activity = serenity::ActivityData::watching("the league");
            ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
        }
    }
}
