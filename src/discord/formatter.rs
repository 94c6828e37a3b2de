// Embed builders for league replies.
//
// Commands load whatever they need (teams, rosters, records) and hand plain
// core types to these functions, which only decide how things look.

use crate::core::challenges::RematchOutcome;
use crate::core::league::{
    format_match_time, Challenge, ChallengeState, GameType, Team, TeamRole,
};
use crate::core::servers::{ServerActivity, ServerPower};
use crate::core::standings::{PilotStats, TeamRecord};
use crate::core::teams::RosterEntry;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

pub const COLOR_SUCCESS: u32 = 0x2ECC71;
pub const COLOR_INFO: u32 = 0x3498DB;
pub const COLOR_WARNING: u32 = 0xF1C40F;
pub const COLOR_ERROR: u32 = 0xE74C3C;

/// Discord caps embed field values at 1024 characters.
const FIELD_LIMIT: usize = 1024;

fn clamp(text: String) -> String {
    if text.chars().count() <= FIELD_LIMIT {
        return text;
    }
    let mut clamped: String = text.chars().take(FIELD_LIMIT - 3).collect();
    clamped.push_str("...");
    clamped
}

fn or_dash(text: String) -> String {
    if text.is_empty() {
        "-".to_string()
    } else {
        text
    }
}

pub fn success(title: impl Into<String>, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_SUCCESS)
}

pub fn warning(message: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("⚠️ Can't do that")
        .description(message)
        .color(COLOR_WARNING)
}

pub fn internal_error() -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("❌ Something went wrong")
        .description("The command failed. An admin has been notified in the logs.")
        .color(COLOR_ERROR)
}

// ============================================================================
// TEAMS
// ============================================================================

fn role_badge(role: TeamRole) -> &'static str {
    match role {
        TeamRole::Founder => "👑",
        TeamRole::Captain => "⭐",
        TeamRole::Pilot => "•",
    }
}

pub fn team_embed(team: &Team, roster: &[RosterEntry], record: Option<&TeamRecord>) -> serenity::CreateEmbed {
    let members = roster
        .iter()
        .map(|e| format!("{} {} ({})", role_badge(e.role), e.pilot.name, e.role))
        .collect::<Vec<_>>()
        .join("\n");

    let home_maps = team
        .home_maps
        .iter()
        .map(|set| format!("**{} {}**: {}", set.game_type.code(), set.team_size, set.maps.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    let mut embed = serenity::CreateEmbed::new()
        .title(team.display_name())
        .color(if team.disbanded { COLOR_ERROR } else { COLOR_INFO })
        .field("Roster", clamp(or_dash(members)), false)
        .field("Home maps", clamp(or_dash(home_maps)), false)
        .field(
            "Timezone",
            team.timezone.clone().unwrap_or_else(|| "Not set".to_string()),
            true,
        );

    if let Some(record) = record {
        embed = embed.field(
            "Record",
            format!("{}-{}-{}", record.wins, record.losses, record.ties),
            true,
        );
    }
    if team.penalties > 0 {
        embed = embed.field("Penalties", team.penalties.to_string(), true);
    }
    if team.locked {
        embed = embed.footer(serenity::CreateEmbedFooter::new("Roster locked"));
    }
    if team.disbanded {
        embed = embed.footer(serenity::CreateEmbedFooter::new("Disbanded"));
    }
    embed
}

pub fn invites_embed(teams: &[Team]) -> serenity::CreateEmbed {
    let list = teams
        .iter()
        .map(|t| format!("• {}", t.display_name()))
        .collect::<Vec<_>>()
        .join("\n");
    serenity::CreateEmbed::new()
        .title("📨 Pending invites")
        .description(if list.is_empty() {
            "You have no pending invites.".to_string()
        } else {
            format!("{}\n\nAccept with `/team accept`.", list)
        })
        .color(COLOR_INFO)
}

pub fn team_list_embed(teams: &[Team]) -> serenity::CreateEmbed {
    let list = teams
        .iter()
        .map(|t| format!("• {} ({} pilots)", t.display_name(), t.members.len()))
        .collect::<Vec<_>>()
        .join("\n");
    serenity::CreateEmbed::new()
        .title("🛡️ Active teams")
        .description(clamp(or_dash(list)))
        .color(COLOR_INFO)
}

// ============================================================================
// CHALLENGES
// ============================================================================

fn state_color(state: ChallengeState) -> u32 {
    match state {
        ChallengeState::Voided => COLOR_ERROR,
        ChallengeState::Confirmed | ChallengeState::Rematched => COLOR_SUCCESS,
        ChallengeState::Reported | ChallengeState::TimeSuggested => COLOR_WARNING,
        ChallengeState::Unscheduled | ChallengeState::Scheduled => COLOR_INFO,
    }
}

/// Short one-line label, e.g. `#12 [ALP] Alpha vs [BRV] Bravo (TA)`.
pub fn challenge_label(challenge: &Challenge, challenging: &Team, challenged: &Team) -> String {
    format!(
        "#{} {} vs {} ({})",
        challenge.id,
        challenging.display_name(),
        challenged.display_name(),
        challenge.game_type.code()
    )
}

/// Full challenge card. `timezone` is the viewer's, for rendering times.
pub fn challenge_embed(
    challenge: &Challenge,
    challenging: &Team,
    challenged: &Team,
    timezone: Option<&str>,
) -> serenity::CreateEmbed {
    let state = challenge.state();
    let home = if challenge.home_map_team == challenging.id {
        challenging
    } else {
        challenged
    };
    let name_of = |team_id: u64| {
        if team_id == challenging.id {
            challenging.display_name()
        } else {
            challenged.display_name()
        }
    };

    let title = challenge
        .title
        .clone()
        .unwrap_or_else(|| format!("Challenge #{}", challenge.id));

    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .description(format!(
            "{} vs {}",
            challenging.display_name(),
            challenged.display_name()
        ))
        .color(state_color(state))
        .field("Status", state.to_string(), true)
        .field("Game type", challenge.game_type.to_string(), true)
        .field("Home maps", home.display_name(), true);

    let size = match (&challenge.team_size, &challenge.suggested_team_size) {
        (Some(size), _) => size.to_string(),
        (None, Some(s)) => format!("{} suggested by {}", s.value, name_of(s.team)),
        (None, None) => "Not set".to_string(),
    };
    embed = embed.field("Team size", size, true);

    let map = match (&challenge.map, &challenge.suggested_map) {
        (Some(map), _) if challenge.used_neutral_map => format!("{} (neutral)", map),
        (Some(map), _) => map.clone(),
        (None, Some(s)) => format!("{} suggested by {}", s.value, name_of(s.team)),
        (None, None) => "Not set".to_string(),
    };
    embed = embed.field("Map", map, true);

    let time = match (&challenge.match_time, &challenge.suggested_time) {
        (Some(time), _) => format_match_time(*time, timezone),
        (None, Some(s)) => format!(
            "{} suggested by {}",
            format_match_time(s.value, timezone),
            name_of(s.team)
        ),
        (None, None) => "Not scheduled".to_string(),
    };
    embed = embed.field("Match time", time, false);

    if let Some(clock) = &challenge.clock {
        embed = embed.field(
            "⏰ Clock",
            format!(
                "Clocked by {}. Must be scheduled by {}.",
                name_of(clock.team),
                format_match_time(clock.deadline, timezone)
            ),
            false,
        );
    }

    if let Some(report) = &challenge.report {
        let status = if challenge.confirmed_at.is_some() {
            "Final".to_string()
        } else {
            format!("Reported by {}, awaiting confirmation", name_of(report.reporting_team))
        };
        embed = embed.field(
            "Score",
            format!(
                "{} {} - {} {}\n{}",
                challenging.tag, report.challenging_score, report.challenged_score, challenged.tag, status
            ),
            false,
        );
    }

    if let Some(caster) = challenge.caster {
        embed = embed.field("🎙️ Caster", format!("<@{}>", caster), true);
    }
    if challenge.postseason {
        embed = embed.field("Postseason", "Yes", true);
    }
    if let Some(void) = &challenge.voided {
        embed = embed.field("Voided", void.reason.clone(), false);
    }
    if let Some(rematch) = challenge.rematch_challenge {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "Rematch scheduled as challenge #{}",
            rematch
        )));
    }
    embed
}

/// Box score for a confirmed challenge. `names` resolves pilot ids.
pub fn box_score_embed(
    challenge: &Challenge,
    challenging: &Team,
    challenged: &Team,
    names: &dyn Fn(u64) -> String,
) -> serenity::CreateEmbed {
    let side = |team: &Team| {
        let lines = challenge
            .stats
            .iter()
            .filter(|s| s.team_id == team.id)
            .map(|s| format!("{}: {}/{}/{}", names(s.pilot_id), s.kills, s.assists, s.deaths))
            .collect::<Vec<_>>()
            .join("\n");
        clamp(or_dash(lines))
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("📊 Box score for challenge #{}", challenge.id))
        .color(COLOR_INFO)
        .field(format!("{} (K/A/D)", challenging.display_name()), side(challenging), true)
        .field(format!("{} (K/A/D)", challenged.display_name()), side(challenged), true);
    if let Some(game_id) = challenge.tracker_game_id {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!("Tracker game {}", game_id)));
    }
    embed
}

pub fn challenge_list_embed(title: &str, lines: &[String]) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(if lines.is_empty() {
            "No challenges.".to_string()
        } else {
            lines.join("\n")
        })
        .color(COLOR_INFO)
}

pub fn rematch_embed(outcome: &RematchOutcome) -> serenity::CreateEmbed {
    match outcome {
        RematchOutcome::Requested(challenge) => success(
            "🔁 Rematch requested",
            format!(
                "The other team must also request a rematch of challenge #{}.",
                challenge.id
            ),
        ),
        RematchOutcome::Created { original, rematch } => success(
            "🔁 Rematch created",
            format!(
                "Challenge #{} will be replayed as challenge #{}.",
                original.id, rematch.id
            ),
        ),
    }
}

pub fn schedule_embed(entries: &[(String, DateTime<Utc>)], timezone: Option<&str>) -> serenity::CreateEmbed {
    let lines = entries
        .iter()
        .map(|(label, time)| format!("**{}**\n{}", format_match_time(*time, timezone), label))
        .collect::<Vec<_>>();
    serenity::CreateEmbed::new()
        .title("📅 Upcoming matches")
        .description(if lines.is_empty() {
            "No matches are scheduled.".to_string()
        } else {
            lines.join("\n\n")
        })
        .color(COLOR_INFO)
}

// ============================================================================
// LEAGUE VIEWS
// ============================================================================

pub fn maps_embed(pools: &[(GameType, Vec<String>)]) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("🗺️ Map pool")
        .color(COLOR_INFO);
    for (game_type, maps) in pools {
        embed = embed.field(game_type.to_string(), clamp(or_dash(maps.join(", "))), false);
    }
    embed
}

pub fn standings_embed(season: u32, records: &[TeamRecord]) -> serenity::CreateEmbed {
    let lines = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "`{:>2}.` **[{}] {}** {}-{}-{} ({:+})",
                i + 1,
                r.tag,
                r.name,
                r.wins,
                r.losses,
                r.ties,
                r.point_differential()
            )
        })
        .collect::<Vec<_>>();
    serenity::CreateEmbed::new()
        .title(format!("🏆 Season {} standings", season))
        .description(if lines.is_empty() {
            "No teams yet.".to_string()
        } else {
            lines.join("\n")
        })
        .color(COLOR_INFO)
}

pub fn pilot_stats_embed(season: u32, stats: &[PilotStats], limit: usize) -> serenity::CreateEmbed {
    let lines = stats
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, s)| {
            format!(
                "`{:>2}.` **{}** KDA {:.2} ({}/{}/{} in {} games)",
                i + 1,
                s.name,
                s.kda(),
                s.kills,
                s.assists,
                s.deaths,
                s.games
            )
        })
        .collect::<Vec<_>>();
    serenity::CreateEmbed::new()
        .title(format!("🎯 Season {} pilot stats", season))
        .description(if lines.is_empty() {
            "No stats recorded yet.".to_string()
        } else {
            lines.join("\n")
        })
        .color(COLOR_INFO)
}

// ============================================================================
// SERVERS
// ============================================================================

pub fn servers_embed(statuses: &[(String, ServerActivity)]) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("🖥️ Game servers")
        .color(COLOR_INFO);
    if statuses.is_empty() {
        return embed.description("No game servers are configured.");
    }
    for (name, activity) in statuses {
        let icon = match activity.power {
            ServerPower::Running => "🟢",
            ServerPower::Stopped => "🔴",
            ServerPower::Unknown => "⚪",
        };
        let mut value = format!("{} {}", icon, activity.power);
        if let Some(pilot) = activity.started_by {
            value.push_str(&format!("\nStarted by <@{}>", pilot));
        }
        if let Some(last) = activity.last_activity {
            value.push_str(&format!("\nLast activity <t:{}:R>", last.timestamp()));
        }
        embed = embed.field(name, value, true);
    }
    embed
}
