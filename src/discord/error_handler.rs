// Framework error hook.
//
// League rule violations come back from commands as `LeagueError` warnings
// and are shown only to the pilot who ran the command. Anything else is an
// internal failure: logged in full, and the user gets a generic message.

use super::formatter;
use super::{Data, Error};
use crate::core::league::LeagueError;

/// The message to show for a rule violation, or `None` for internal failures.
fn refusal(error: &Error) -> Option<String> {
    error
        .downcast_ref::<LeagueError>()
        .filter(|e| e.is_warning())
        .map(|e| e.to_string())
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let embed = match refusal(&error) {
                Some(message) => {
                    tracing::debug!(
                        command = %ctx.command().qualified_name,
                        user_id = ctx.author().id.get(),
                        %message,
                        "Command refused"
                    );
                    formatter::warning(message)
                }
                None => {
                    tracing::error!(
                        command = %ctx.command().qualified_name,
                        user_id = ctx.author().id.get(),
                        error = %error,
                        "Command failed"
                    );
                    formatter::internal_error()
                }
            };

            let reply = poise::CreateReply::default().embed(embed).ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::warn!("Failed to send error reply: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling framework error: {}", e);
            }
        }
    }
}
