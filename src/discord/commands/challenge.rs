// /challenge commands - everything a captain does with a match.

use super::helpers::{
    author_pilot, challenge_label, reply, reply_challenge, reply_success, GameTypeChoice,
    TeamSizeChoice,
};
use crate::core::league::{Challenge, LeagueError};
use crate::discord::formatter;
use crate::discord::{Context, Error};
use std::collections::HashMap;

/// Challenge another team and schedule the match.
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "create",
        "size",
        "confirmsize",
        "pickmap",
        "neutral",
        "confirmmap",
        "time",
        "confirmtime",
        "clock",
        "report",
        "confirm",
        "rematch",
        "cast",
        "uncast",
        "view",
        "list"
    )
)]
pub async fn challenge(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Challenge another team.
#[poise::command(slash_command, guild_only)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Team name or tag to challenge"] opponent: String,
    #[description = "Game type"] game_type: GameTypeChoice,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    author_pilot(ctx).await?;
    let challenge = ctx
        .data()
        .challenges
        .create_challenge(ctx.author().id.get(), &opponent, game_type.into())
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Suggest a team size.
#[poise::command(slash_command, guild_only)]
pub async fn size(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Team size"] team_size: TeamSizeChoice,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .suggest_team_size(ctx.author().id.get(), id, team_size.into())
        .await?;
    reply_success(
        ctx,
        "Team size suggested",
        format!(
            "The other team can confirm with `/challenge confirmsize {}`.",
            challenge.id
        ),
    )
    .await
}

/// Confirm the other team's suggested team size.
#[poise::command(slash_command, guild_only)]
pub async fn confirmsize(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .confirm_team_size(ctx.author().id.get(), id)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Pick one of the home team's maps (away team only).
#[poise::command(slash_command, guild_only)]
pub async fn pickmap(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Home map option (1-3)"]
    #[min = 1]
    #[max = 9]
    option: u8,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .pick_map(ctx.author().id.get(), id, option as usize)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Suggest a neutral map instead of a home map.
#[poise::command(slash_command, guild_only)]
pub async fn neutral(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Map from the pool"] map: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .suggest_neutral_map(ctx.author().id.get(), id, &map)
        .await?;
    reply_success(
        ctx,
        "Neutral map suggested",
        format!(
            "The other team can confirm with `/challenge confirmmap {}`.",
            challenge.id
        ),
    )
    .await
}

/// Confirm the other team's neutral map.
#[poise::command(slash_command, guild_only)]
pub async fn confirmmap(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .confirm_neutral_map(ctx.author().id.get(), id)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Suggest a match time in your timezone, e.g. `2024-05-01 8:00 PM`.
#[poise::command(slash_command, guild_only)]
pub async fn time(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Date and time, e.g. 2024-05-01 20:00"] when: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let pilot = author_pilot(ctx).await?;
    let challenge = ctx
        .data()
        .challenges
        .suggest_time(&pilot, id, &when)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Confirm the other team's suggested match time.
#[poise::command(slash_command, guild_only)]
pub async fn confirmtime(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .confirm_time(ctx.author().id.get(), id)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Put a clock on a challenge, forcing it to be scheduled.
#[poise::command(slash_command, guild_only)]
pub async fn clock(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .clock(ctx.author().id.get(), id)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Report the result. The losing team reports; enter your score first.
#[poise::command(slash_command, guild_only)]
pub async fn report(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
    #[description = "Your team's score"] your_score: i64,
    #[description = "The other team's score"] their_score: i64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .report(ctx.author().id.get(), id, your_score, their_score)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Confirm the result the other team reported.
#[poise::command(slash_command, guild_only)]
pub async fn confirm(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .confirm_report(ctx.author().id.get(), id)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Request a rematch of a tied match.
#[poise::command(slash_command, guild_only)]
pub async fn rematch(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let outcome = ctx
        .data()
        .challenges
        .request_rematch(ctx.author().id.get(), id)
        .await?;
    reply(ctx, formatter::rematch_embed(&outcome)).await
}

/// Sign up to cast a scheduled match.
#[poise::command(slash_command, guild_only)]
pub async fn cast(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    author_pilot(ctx).await?;
    let challenge = ctx
        .data()
        .challenges
        .cast(ctx.author().id.get(), id)
        .await?;
    reply_challenge(ctx, &challenge).await
}

/// Stop casting a match.
#[poise::command(slash_command, guild_only)]
pub async fn uncast(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let challenge = ctx
        .data()
        .challenges
        .uncast(ctx.author().id.get(), id)
        .await?;
    reply_success(
        ctx,
        "🎙️ Caster removed",
        format!("You are no longer casting challenge #{}.", challenge.id),
    )
    .await
}

/// Show a challenge, with its box score once one is recorded.
#[poise::command(slash_command, guild_only)]
pub async fn view(
    ctx: Context<'_>,
    #[description = "Challenge number"] id: u64,
) -> Result<(), Error> {
    let challenge = ctx.data().challenges.get_challenge(id).await?;
    let card = super::helpers::challenge_card(ctx, &challenge).await?;
    let mut message = poise::CreateReply::default().embed(card);
    if !challenge.stats.is_empty() {
        message = message.embed(box_score(ctx, &challenge).await?);
    }
    ctx.send(message).await?;
    Ok(())
}

async fn box_score(
    ctx: Context<'_>,
    challenge: &Challenge,
) -> Result<poise::serenity_prelude::CreateEmbed, Error> {
    let teams = &ctx.data().teams;
    let challenging = teams.get_team(challenge.challenging_team).await?;
    let challenged = teams.get_team(challenge.challenged_team).await?;

    let mut names = HashMap::new();
    for line in &challenge.stats {
        if let Some(pilot) = teams.get_pilot(line.pilot_id).await? {
            names.insert(pilot.id, pilot.name);
        }
    }
    let lookup = |id: u64| names.get(&id).cloned().unwrap_or_else(|| format!("<@{}>", id));
    Ok(formatter::box_score_embed(
        challenge,
        &challenging,
        &challenged,
        &lookup,
    ))
}

/// List a team's challenges (defaults to your team's open ones).
#[poise::command(slash_command, guild_only)]
pub async fn list(
    ctx: Context<'_>,
    #[description = "Team name or tag"] team: Option<String>,
    #[description = "Include closed challenges"] all: Option<bool>,
) -> Result<(), Error> {
    let data = ctx.data();
    let team = match team {
        Some(query) => data.teams.find_team(&query).await?,
        None => data
            .teams
            .team_for_pilot(ctx.author().id.get())
            .await?
            .ok_or(LeagueError::NotOnTeam)?,
    };
    let challenges = data
        .challenges
        .challenges_for_team(team.id, all.unwrap_or(false))
        .await?;

    let mut lines = Vec::with_capacity(challenges.len());
    for challenge in challenges.iter().rev().take(20) {
        let label = challenge_label(ctx, challenge).await?;
        lines.push(format!("{} - {}", label, challenge.state()));
    }
    reply(
        ctx,
        formatter::challenge_list_embed(&format!("⚔️ Challenges for {}", team.display_name()), &lines),
    )
    .await
}
