// /admin commands - league staff overrides.
//
// Every subcommand repeats `required_permissions` because poise checks the
// invoked subcommand, not its parent.

use super::helpers::{pilot_for, reply_challenge, reply_success, GameTypeChoice, TeamSizeChoice};
use super::presence;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// League administration.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands(
        "void",
        "extend",
        "forcesize",
        "forcemap",
        "forcetime",
        "forcereport",
        "title",
        "creatematch",
        "addstat",
        "clearstats",
        "import",
        "penalize",
        "lock",
        "unlock",
        "rename",
        "retag",
        "reinstate",
        "addmap",
        "removemap",
        "postseason",
        "endpostseason",
        "newseason"
    )
)]
pub async fn admin(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

// =============================================================================
// CHALLENGE OVERRIDES
// =============================================================================

/// Void a challenge.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn void(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Reason shown on the challenge"] reason: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx.data().challenges.void(id, &reason).await?;
    reply_challenge(ctx, &challenge).await
}

/// Give a clocked challenge more time.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn extend(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx.data().challenges.extend_clock(id).await?;
    reply_challenge(ctx, &challenge).await
}

/// Set a challenge's team size.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn forcesize(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Team size"] team_size: TeamSizeChoice,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .force_team_size(id, team_size.into())
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Set a challenge's map.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn forcemap(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Map from the pool"] map: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx.data().challenges.force_map(id, &map).await?;
    reply_challenge(ctx, &challenge).await
}

/// Set a challenge's match time (UTC).
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn forcetime(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Date and time in UTC, e.g. 2024-05-01 20:00"] when: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx.data().challenges.force_time(id, &when).await?;
    reply_challenge(ctx, &challenge).await
}

/// Record a confirmed result directly.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn forcereport(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Challenging team's score"] challenging_score: i64,
    #[description = "Challenged team's score"] challenged_score: i64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .force_report(id, challenging_score, challenged_score)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Give a challenge a title, or clear it.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn title(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Title (leave empty to clear)"] title: Option<String>,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx.data().challenges.set_title(id, title).await?;
    reply_challenge(ctx, &challenge).await
}

/// Create a challenge between two teams, e.g. for the postseason bracket.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn creatematch(
    ctx: Context<'_>,
    #[description = "Home team name or tag"] home: String,
    #[description = "Away team name or tag"] away: String,
    #[description = "Game type"] game_type: GameTypeChoice,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .admin_create_challenge(&home, &away, game_type.into())
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Add one pilot's line to a challenge's box score.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn addstat(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Pilot"] pilot: serenity::User,
    #[description = "Team the pilot played for"] team: String,
    #[description = "Kills"] kills: u32,
    #[description = "Assists"] assists: u32,
    #[description = "Deaths"] deaths: u32,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let pilot = pilot_for(ctx, &pilot).await?;
    let challenge = ctx
        .data()
        .challenges
        .add_stat(id, &pilot, &team, kills, assists, deaths)
        .await?;
    reply_success(
        ctx,
        "📊 Stat line recorded",
        format!(
            "{} {}/{}/{} for challenge #{}.",
            pilot.name, kills, assists, deaths, challenge.id
        ),
    )
    .await
}

/// Remove a challenge's box score.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn clearstats(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx.data().challenges.clear_stats(id).await?;
    reply_success(
        ctx,
        "Box score cleared",
        format!("Challenge #{} has no stats recorded.", challenge.id),
    )
    .await
}

/// Import a challenge's box score from the game tracker.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn import(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Tracker game id"] game_id: u64,
    #[description = "Team that played on blue"] blue_team: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let _permit = ctx.data().gate.enter().await?;
    let data = ctx.data();
    let challenge = data
        .challenges
        .import_box_score(data.tracker.as_ref(), id, game_id, &blue_team)
        .await?;
    reply_success(
        ctx,
        "📊 Box score imported",
        format!(
            "Tracker game {} imported into challenge #{} ({} stat lines).",
            game_id,
            challenge.id,
            challenge.stats.len()
        ),
    )
    .await
}

// =============================================================================
// TEAM OVERRIDES
// =============================================================================

/// Add a penalty to a team.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn penalize(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let team = ctx.data().teams.penalize_team(&team).await?;
    reply_success(
        ctx,
        "⚠️ Team penalized",
        format!("{} now has {} penalties.", team.display_name(), team.penalties),
    )
    .await
}

/// Lock a team's roster.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn lock(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let team = ctx.data().teams.set_locked(&team, true).await?;
    reply_success(
        ctx,
        "🔒 Roster locked",
        format!("{} cannot change its roster.", team.display_name()),
    )
    .await
}

/// Unlock a team's roster.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn unlock(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let team = ctx.data().teams.set_locked(&team, false).await?;
    reply_success(
        ctx,
        "🔓 Roster unlocked",
        format!("{} can change its roster again.", team.display_name()),
    )
    .await
}

/// Rename a team.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn rename(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
    #[description = "New name"] name: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let team = ctx.data().teams.rename_team(&team, &name).await?;
    reply_success(ctx, "Team renamed", format!("Now known as {}.", team.display_name())).await
}

/// Change a team's tag.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn retag(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
    #[description = "New tag"] tag: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let team = ctx.data().teams.retag_team(&team, &tag).await?;
    reply_success(ctx, "Team retagged", format!("Now known as {}.", team.display_name())).await
}

/// Bring a disbanded team back with a new founder.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn reinstate(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
    #[description = "New founder"] founder: serenity::User,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let founder = pilot_for(ctx, &founder).await?;
    let team = ctx.data().teams.reinstate_team(&team, &founder).await?;
    reply_success(
        ctx,
        "Team reinstated",
        format!("{} is back, founded by <@{}>.", team.display_name(), founder.id),
    )
    .await
}

// =============================================================================
// SEASON AND MAP POOL
// =============================================================================

/// Add a map to a game type's pool.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn addmap(
    ctx: Context<'_>,
    #[description = "Game type"] game_type: GameTypeChoice,
    #[description = "Map name"] map: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let game_type = game_type.into();
    let map = ctx.data().season.add_map(game_type, &map).await?;
    reply_success(
        ctx,
        "🗺️ Map added",
        format!("`{}` is now in the {} pool.", map, game_type),
    )
    .await
}

/// Remove a map from a game type's pool.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn removemap(
    ctx: Context<'_>,
    #[description = "Game type"] game_type: GameTypeChoice,
    #[description = "Map name"] map: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let game_type = game_type.into();
    ctx.data().season.remove_map(game_type, &map).await?;
    reply_success(
        ctx,
        "🗺️ Map removed",
        format!("`{}` is no longer in the {} pool.", map.trim(), game_type),
    )
    .await
}

/// Start the postseason. New challenges are blocked until it ends.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn postseason(ctx: Context<'_>) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let season = ctx.data().season.start_postseason().await?;
    presence::show_season(ctx.serenity_context(), &season);
    reply_success(
        ctx,
        "🏆 Postseason started",
        format!("Season {} is in the postseason.", season.number),
    )
    .await
}

/// End the postseason.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn endpostseason(ctx: Context<'_>) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let season = ctx.data().season.end_postseason().await?;
    presence::show_season(ctx.serenity_context(), &season);
    reply_success(
        ctx,
        "Postseason ended",
        format!("Season {} is back in the regular season.", season.number),
    )
    .await
}

/// Start a new season.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn newseason(ctx: Context<'_>) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let season = ctx.data().season.start_new_season().await?;
    presence::show_season(ctx.serenity_context(), &season);
    reply_success(
        ctx,
        "🎉 New season",
        format!("Season {} has begun. Clocks and standings start fresh.", season.number),
    )
    .await
}
