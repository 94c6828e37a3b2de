// /team commands - founding, rosters, leadership and home maps.
//
// Same pattern as every other command file: translate the Discord input,
// take the command gate when the command writes, call TeamService, reply.

use super::helpers::{
    author_pilot, pilot_for, reply, reply_success, GameTypeChoice, TeamSizeChoice,
};
use crate::core::league::{GameType, TeamSize};
use crate::discord::formatter;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Team management.
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "create",
        "invite",
        "uninvite",
        "accept",
        "decline",
        "leave",
        "remove",
        "captain",
        "uncaptain",
        "transfer",
        "disband",
        "homemaps",
        "timezone",
        "roster",
        "list"
    )
)]
pub async fn team(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Found a new team. You become its founder.
#[poise::command(slash_command, guild_only)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Team name"] name: String,
    #[description = "Short tag, e.g. ACE"] tag: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let pilot = author_pilot(ctx).await?;
    let team = ctx.data().teams.create_team(&pilot, &name, &tag).await?;
    reply_success(
        ctx,
        "🚀 Team founded",
        format!(
            "{} is ready. Invite pilots with `/team invite` and set home maps with `/team homemaps`.",
            team.display_name()
        ),
    )
    .await
}

/// Invite a pilot to your team.
#[poise::command(slash_command, guild_only)]
pub async fn invite(
    ctx: Context<'_>,
    #[description = "Pilot to invite"] pilot: serenity::User,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let target = pilot_for(ctx, &pilot).await?;
    let team = ctx
        .data()
        .teams
        .invite_pilot(ctx.author().id.get(), &target)
        .await?;
    reply_success(
        ctx,
        "📨 Invite sent",
        format!(
            "<@{}> has been invited to {}. They can accept with `/team accept {}`.",
            target.id, team.display_name(), team.tag
        ),
    )
    .await
}

/// Withdraw a pending invite.
#[poise::command(slash_command, guild_only)]
pub async fn uninvite(
    ctx: Context<'_>,
    #[description = "Pilot whose invite to cancel"] pilot: serenity::User,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let target = pilot_for(ctx, &pilot).await?;
    let team = ctx
        .data()
        .teams
        .cancel_invite(ctx.author().id.get(), &target)
        .await?;
    reply_success(
        ctx,
        "Invite cancelled",
        format!("<@{}> is no longer invited to {}.", target.id, team.display_name()),
    )
    .await
}

/// Accept an invite and join a team.
#[poise::command(slash_command, guild_only)]
pub async fn accept(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let pilot = author_pilot(ctx).await?;
    let team = ctx.data().teams.accept_invite(&pilot, &team).await?;
    reply_success(
        ctx,
        "🤝 Welcome aboard",
        format!("<@{}> joined {}.", pilot.id, team.display_name()),
    )
    .await
}

/// Decline an invite.
#[poise::command(slash_command, guild_only)]
pub async fn decline(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let pilot = author_pilot(ctx).await?;
    let team = ctx.data().teams.decline_invite(&pilot, &team).await?;
    reply_success(
        ctx,
        "Invite declined",
        format!("You declined the invite from {}.", team.display_name()),
    )
    .await
}

/// Leave your team.
#[poise::command(slash_command, guild_only)]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let pilot = author_pilot(ctx).await?;
    let team = ctx.data().teams.leave_team(&pilot).await?;
    reply_success(
        ctx,
        "👋 Left team",
        format!("<@{}> left {}.", pilot.id, team.display_name()),
    )
    .await
}

/// Remove a pilot from your team.
#[poise::command(slash_command, guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Pilot to remove"] pilot: serenity::User,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let target = pilot_for(ctx, &pilot).await?;
    let team = ctx
        .data()
        .teams
        .remove_pilot(ctx.author().id.get(), &target)
        .await?;
    reply_success(
        ctx,
        "Pilot removed",
        format!("<@{}> was removed from {}.", target.id, team.display_name()),
    )
    .await
}

/// Make a pilot a captain (founder only).
#[poise::command(slash_command, guild_only)]
pub async fn captain(
    ctx: Context<'_>,
    #[description = "Pilot to promote"] pilot: serenity::User,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let target = pilot_for(ctx, &pilot).await?;
    let team = ctx
        .data()
        .teams
        .make_captain(ctx.author().id.get(), &target)
        .await?;
    reply_success(
        ctx,
        "⭐ New captain",
        format!("<@{}> is now a captain of {}.", target.id, team.display_name()),
    )
    .await
}

/// Remove a captain (founder only).
#[poise::command(slash_command, guild_only)]
pub async fn uncaptain(
    ctx: Context<'_>,
    #[description = "Captain to demote"] pilot: serenity::User,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let target = pilot_for(ctx, &pilot).await?;
    let team = ctx
        .data()
        .teams
        .remove_captain(ctx.author().id.get(), &target)
        .await?;
    reply_success(
        ctx,
        "Captain removed",
        format!("<@{}> is no longer a captain of {}.", target.id, team.display_name()),
    )
    .await
}

/// Hand the team over to another member (founder only).
#[poise::command(slash_command, guild_only)]
pub async fn transfer(
    ctx: Context<'_>,
    #[description = "New founder"] pilot: serenity::User,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let target = pilot_for(ctx, &pilot).await?;
    let team = ctx
        .data()
        .teams
        .transfer_founder(ctx.author().id.get(), &target)
        .await?;
    reply_success(
        ctx,
        "👑 Team transferred",
        format!("<@{}> is now the founder of {}.", target.id, team.display_name()),
    )
    .await
}

/// Disband your team. Open challenges are voided.
#[poise::command(slash_command, guild_only)]
pub async fn disband(ctx: Context<'_>) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let outcome = ctx
        .data()
        .teams
        .disband_team(ctx.author().id.get())
        .await?;
    let voided = if outcome.voided_challenges.is_empty() {
        String::new()
    } else {
        let ids = outcome
            .voided_challenges
            .iter()
            .map(|id| format!("#{}", id))
            .collect::<Vec<_>>()
            .join(", ");
        format!("\nVoided challenges: {}", ids)
    };
    reply_success(
        ctx,
        "Team disbanded",
        format!("{} has been disbanded.{}", outcome.team.display_name(), voided),
    )
    .await
}

/// Set your home maps for a game type and team size.
#[poise::command(slash_command, guild_only)]
pub async fn homemaps(
    ctx: Context<'_>,
    #[description = "Game type"] game_type: GameTypeChoice,
    #[description = "Team size"] team_size: TeamSizeChoice,
    #[description = "First home map"] map1: String,
    #[description = "Second home map"] map2: String,
    #[description = "Third home map"] map3: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let game_type = GameType::from(game_type);
    let team_size = TeamSize::from(team_size);
    let team = ctx
        .data()
        .teams
        .set_home_maps(
            ctx.author().id.get(),
            game_type,
            team_size,
            vec![map1, map2, map3],
        )
        .await?;
    let maps = team
        .home_map_set(game_type, team_size)
        .map(|set| set.maps.join(", "))
        .unwrap_or_default();
    reply_success(
        ctx,
        "🗺️ Home maps set",
        format!(
            "{} {} {} home maps: {}",
            team.display_name(),
            game_type.code(),
            team_size,
            maps
        ),
    )
    .await
}

/// Set your team's default timezone.
#[poise::command(slash_command, guild_only)]
pub async fn timezone(
    ctx: Context<'_>,
    #[description = "IANA timezone, e.g. America/New_York"] timezone: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let team = ctx
        .data()
        .teams
        .set_team_timezone(ctx.author().id.get(), &timezone)
        .await?;
    reply_success(
        ctx,
        "🕒 Team timezone set",
        format!(
            "{} now uses {}.",
            team.display_name(),
            team.timezone.unwrap_or_default()
        ),
    )
    .await
}

/// Show a team's roster (defaults to your own team).
#[poise::command(slash_command, guild_only)]
pub async fn roster(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let team = match team {
        Some(query) => data.teams.find_team(&query).await?,
        None => data
            .teams
            .team_for_pilot(ctx.author().id.get())
            .await?
            .ok_or(crate::core::league::LeagueError::NotOnTeam)?,
    };
    let roster = data.teams.roster(&team).await?;
    let season = data.season.current().await?;
    let record = data.standings.team_record(&team, season.number).await?;
    reply(ctx, formatter::team_embed(&team, &roster, Some(&record))).await
}

/// List every active team.
#[poise::command(slash_command, guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let teams = ctx.data().teams.list_active_teams().await?;
    reply(ctx, formatter::team_list_embed(&teams)).await
}
