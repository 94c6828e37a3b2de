// Small pieces shared by the league command files.

use crate::core::league::{Challenge, GameType, LeagueError, Pilot, TeamSize};
use crate::discord::formatter;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum GameTypeChoice {
    #[name = "Team Anarchy"]
    TeamAnarchy,
    #[name = "Capture the Flag"]
    CaptureTheFlag,
}

impl From<GameTypeChoice> for GameType {
    fn from(choice: GameTypeChoice) -> Self {
        match choice {
            GameTypeChoice::TeamAnarchy => GameType::TeamAnarchy,
            GameTypeChoice::CaptureTheFlag => GameType::CaptureTheFlag,
        }
    }
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum TeamSizeChoice {
    #[name = "2v2"]
    TwoVTwo,
    #[name = "3v3"]
    ThreeVThree,
    #[name = "4v4"]
    FourVFour,
}

impl From<TeamSizeChoice> for TeamSize {
    fn from(choice: TeamSizeChoice) -> Self {
        match choice {
            TeamSizeChoice::TwoVTwo => TeamSize::TwoVTwo,
            TeamSizeChoice::ThreeVThree => TeamSize::ThreeVThree,
            TeamSizeChoice::FourVFour => TeamSize::FourVFour,
        }
    }
}

/// Name we record for a Discord user: their global display name if set.
pub fn display_name(user: &serenity::User) -> String {
    user.global_name.clone().unwrap_or_else(|| user.name.clone())
}

/// Create or refresh the pilot record behind a Discord user.
pub async fn pilot_for(ctx: Context<'_>, user: &serenity::User) -> Result<Pilot, Error> {
    if user.bot {
        return Err(LeagueError::PilotNotFound(display_name(user)).into());
    }
    Ok(ctx
        .data()
        .teams
        .ensure_pilot(user.id.get(), &display_name(user))
        .await?)
}

pub async fn author_pilot(ctx: Context<'_>) -> Result<Pilot, Error> {
    pilot_for(ctx, ctx.author()).await
}

/// Timezone of the pilot running the command, if they set one.
pub async fn viewer_timezone(ctx: Context<'_>) -> Option<String> {
    ctx.data()
        .teams
        .get_pilot(ctx.author().id.get())
        .await
        .ok()
        .flatten()
        .and_then(|p| p.timezone)
}

pub async fn reply(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

pub async fn reply_success(
    ctx: Context<'_>,
    title: impl Into<String>,
    description: impl Into<String>,
) -> Result<(), Error> {
    reply(ctx, formatter::success(title, description)).await
}

/// Full challenge card rendered in the viewer's timezone.
pub async fn challenge_card(
    ctx: Context<'_>,
    challenge: &Challenge,
) -> Result<serenity::CreateEmbed, Error> {
    let teams = &ctx.data().teams;
    let challenging = teams.get_team(challenge.challenging_team).await?;
    let challenged = teams.get_team(challenge.challenged_team).await?;
    let timezone = viewer_timezone(ctx).await;
    Ok(formatter::challenge_embed(
        challenge,
        &challenging,
        &challenged,
        timezone.as_deref(),
    ))
}

pub async fn reply_challenge(ctx: Context<'_>, challenge: &Challenge) -> Result<(), Error> {
    let card = challenge_card(ctx, challenge).await?;
    reply(ctx, card).await
}

/// One-line label for lists.
pub async fn challenge_label(ctx: Context<'_>, challenge: &Challenge) -> Result<String, Error> {
    let teams = &ctx.data().teams;
    let challenging = teams.get_team(challenge.challenging_team).await?;
    let challenged = teams.get_team(challenge.challenged_team).await?;
    Ok(formatter::challenge_label(challenge, &challenging, &challenged))
}
