// Messages the bot posts on its own: expired clocks and idle servers it shut
// down. Both go to the announcement channel when one is configured.

use super::formatter;
use super::Store;
use crate::core::challenges::ChallengeService;
use crate::core::league::Challenge;
use crate::core::teams::TeamService;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use std::collections::HashSet;

/// Remembers which expired clocks were already announced in this run.
#[derive(Debug, Default)]
pub struct ClockNotices {
    announced: HashSet<u64>,
}

impl ClockNotices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only challenges not announced before, and mark them announced.
    pub fn take_new(&mut self, expired: Vec<Challenge>) -> Vec<Challenge> {
        expired
            .into_iter()
            .filter(|c| self.announced.insert(c.id))
            .collect()
    }
}

/// Check for clocks whose deadline passed and announce each one once.
pub async fn announce_expired_clocks(
    http: &serenity::Http,
    channel: Option<u64>,
    challenges: &ChallengeService<Store>,
    teams: &TeamService<Store>,
    notices: &mut ClockNotices,
) {
    let expired = match challenges.expired_clocks(Utc::now()).await {
        Ok(expired) => expired,
        Err(e) => {
            tracing::warn!("Failed to load expired clocks: {}", e);
            return;
        }
    };

    for challenge in notices.take_new(expired) {
        tracing::info!(challenge_id = challenge.id, "Clock expired");
        let Some(channel) = channel else { continue };

        let label = match (
            teams.get_team(challenge.challenging_team).await,
            teams.get_team(challenge.challenged_team).await,
        ) {
            (Ok(challenging), Ok(challenged)) => {
                formatter::challenge_label(&challenge, &challenging, &challenged)
            }
            _ => format!("#{}", challenge.id),
        };
        let deadline = challenge
            .clock
            .as_ref()
            .map(|clock| format!("<t:{}:f>", clock.deadline.timestamp()))
            .unwrap_or_default();
        let embed = serenity::CreateEmbed::new()
            .title("⏰ Clock expired")
            .description(format!(
                "{}\nThe clock deadline {} passed without a scheduled match. An admin will decide the outcome.",
                label, deadline
            ))
            .color(formatter::COLOR_WARNING);

        post(http, channel, embed).await;
    }
}

/// Tell the league which idle servers were shut down.
pub async fn announce_stopped_servers(http: &serenity::Http, channel: Option<u64>, stopped: &[String]) {
    let Some(channel) = channel else { return };
    if stopped.is_empty() {
        return;
    }
    let names = stopped
        .iter()
        .map(|name| format!("`{}`", name))
        .collect::<Vec<_>>()
        .join(", ");
    let embed = serenity::CreateEmbed::new()
        .title("🔴 Idle servers stopped")
        .description(format!("Shut down after no activity: {}", names))
        .color(formatter::COLOR_INFO);
    post(http, channel, embed).await;
}

async fn post(http: &serenity::Http, channel: u64, embed: serenity::CreateEmbed) {
    if let Err(e) = serenity::ChannelId::new(channel)
        .send_message(http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!(channel_id = channel, error = %e, "Failed to post announcement");
    }
}
