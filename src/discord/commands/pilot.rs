// /pilot commands - personal settings.

use super::helpers::{author_pilot, reply};
use crate::discord::formatter;
use crate::discord::{Context, Error};

/// Your pilot settings.
#[poise::command(slash_command, guild_only, subcommands("timezone", "invites"))]
pub async fn pilot(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the timezone used for times you type and see.
#[poise::command(slash_command, guild_only)]
pub async fn timezone(
    ctx: Context<'_>,
    #[description = "IANA timezone, e.g. Europe/London"] timezone: String,
) -> Result<(), Error> {
    let _permit = ctx.data().gate.enter().await?;
    let pilot = author_pilot(ctx).await?;
    let pilot = ctx.data().teams.set_pilot_timezone(&pilot, &timezone).await?;
    let message = format!(
        "Times you enter and see will use {}.",
        pilot.timezone.unwrap_or_default()
    );
    ctx.send(
        poise::CreateReply::default()
            .embed(formatter::success("🕒 Timezone set", message))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// List the teams that have invited you.
#[poise::command(slash_command, guild_only)]
pub async fn invites(ctx: Context<'_>) -> Result<(), Error> {
    let teams = ctx
        .data()
        .teams
        .pending_invites(ctx.author().id.get())
        .await?;
    reply(ctx, formatter::invites_embed(&teams)).await
}

