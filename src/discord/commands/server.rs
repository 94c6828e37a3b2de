// /server commands - on-demand cloud game servers.

use super::helpers::{reply, reply_success};
use crate::core::league::LeagueError;
use crate::core::servers::ServerService;
use crate::discord::formatter;
use crate::discord::{Context, Error};
use std::sync::Arc;

fn servers(ctx: Context<'_>) -> Result<Arc<ServerService>, LeagueError> {
    ctx.data()
        .servers
        .clone()
        .ok_or(LeagueError::ServersDisabled)
}

/// Start, stop and check the league's game servers.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("start", "stop", "keepalive", "status")
)]
pub async fn server(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Start a game server.
#[poise::command(slash_command, guild_only)]
pub async fn start(
    ctx: Context<'_>,
    #[description = "Server name"] name: String,
) -> Result<(), Error> {
    let servers = servers(ctx)?;
    // Refusals after this point can only be ephemeral if the deferral was.
    ctx.defer_ephemeral().await?;
    let _permit = ctx.data().gate.enter().await?;
    servers.start(&name, ctx.author().id.get()).await?;
    let idle_minutes = servers.idle_timeout().num_minutes();
    reply_success(
        ctx,
        "🟢 Server starting",
        format!(
            "`{}` is starting. It shuts down after {} idle minutes unless someone runs `/server keepalive {}`.",
            name.trim(),
            idle_minutes,
            name.trim()
        ),
    )
    .await
}

/// Stop a running game server.
#[poise::command(slash_command, guild_only)]
pub async fn stop(
    ctx: Context<'_>,
    #[description = "Server name"] name: String,
) -> Result<(), Error> {
    let servers = servers(ctx)?;
    ctx.defer_ephemeral().await?;
    let _permit = ctx.data().gate.enter().await?;
    servers.stop(&name).await?;
    reply_success(ctx, "🔴 Server stopped", format!("`{}` is shutting down.", name.trim())).await
}

/// Keep a running server from shutting down for being idle.
#[poise::command(slash_command, guild_only)]
pub async fn keepalive(
    ctx: Context<'_>,
    #[description = "Server name"] name: String,
) -> Result<(), Error> {
    let servers = servers(ctx)?;
    let until = servers.keep_alive(&name)?;
    reply_success(
        ctx,
        "⏳ Server kept alive",
        format!(
            "`{}` stays up until at least <t:{}:t>.",
            name.trim(),
            until.timestamp()
        ),
    )
    .await
}

/// Show every game server's power state.
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let servers = servers(ctx)?;
    ctx.defer().await?;
    for (name, _) in servers.statuses() {
        if let Err(e) = servers.refresh(&name).await {
            tracing::warn!(server = %name, error = %e, "Failed to refresh server status");
        }
    }
    reply(ctx, formatter::servers_embed(&servers.statuses())).await
}
