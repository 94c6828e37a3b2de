// Precondition checks for league commands.
//
// Every check is a pure function over state the service has already loaded.
// A check either returns the value the caller needs next (the team, the
// member, the opponent id...) or the warning that explains why the command
// is refused. Services chain them with `?`.

use super::league_config::LeagueConfig;
use super::league_models::{
    Challenge, GameType, HomeMapSet, Pilot, SeasonState, Suggestion, Team, TeamMember, TeamRole,
    TeamSize,
};
use super::LeagueError;
use chrono::{DateTime, Utc};

// ============================================================================
// SEASON
// ============================================================================

pub fn not_postseason(season: &SeasonState) -> Result<(), LeagueError> {
    if season.postseason {
        Err(LeagueError::Postseason)
    } else {
        Ok(())
    }
}

// ============================================================================
// PILOTS & ROLES
// ============================================================================

/// The pilot's team, or `NotOnTeam`.
pub fn pilot_on_team(team: Option<Team>) -> Result<Team, LeagueError> {
    team.ok_or(LeagueError::NotOnTeam)
}

pub fn pilot_not_on_team(pilot: &Pilot, team: Option<&Team>) -> Result<(), LeagueError> {
    match team {
        Some(_) => Err(LeagueError::AlreadyOnTeam(pilot.name.clone())),
        None => Ok(()),
    }
}

pub fn pilot_is_founder(team: &Team, pilot_id: u64) -> Result<(), LeagueError> {
    match team.role_of(pilot_id) {
        Some(TeamRole::Founder) => Ok(()),
        _ => Err(LeagueError::NotFounder),
    }
}

pub fn pilot_is_captain_or_founder(team: &Team, pilot_id: u64) -> Result<TeamRole, LeagueError> {
    match team.role_of(pilot_id) {
        Some(role) if role.is_leader() => Ok(role),
        _ => Err(LeagueError::NotCaptain),
    }
}

pub fn member_of<'a>(team: &'a Team, pilot: &Pilot) -> Result<&'a TeamMember, LeagueError> {
    team.member(pilot.id)
        .ok_or_else(|| LeagueError::PilotNotOnTeam(pilot.name.clone()))
}

pub fn not_self(actor: u64, target: u64) -> Result<(), LeagueError> {
    if actor == target {
        Err(LeagueError::CannotTargetSelf)
    } else {
        Ok(())
    }
}

// ============================================================================
// TEAMS
// ============================================================================

pub fn team_found(team: Option<Team>, query: &str) -> Result<Team, LeagueError> {
    team.ok_or_else(|| LeagueError::TeamNotFound(query.to_string()))
}

pub fn team_active(team: &Team) -> Result<(), LeagueError> {
    if team.disbanded {
        Err(LeagueError::TeamDisbanded(team.display_name()))
    } else {
        Ok(())
    }
}

pub fn team_unlocked(team: &Team) -> Result<(), LeagueError> {
    if team.locked {
        Err(LeagueError::TeamLocked(team.display_name()))
    } else {
        Ok(())
    }
}

pub fn team_not_penalized(team: &Team) -> Result<(), LeagueError> {
    if team.penalties > 0 {
        Err(LeagueError::Penalized(team.display_name()))
    } else {
        Ok(())
    }
}

/// Members plus pending invites must stay within the roster cap.
pub fn roster_has_room(team: &Team, config: &LeagueConfig) -> Result<(), LeagueError> {
    if team.members.len() + team.invites.len() >= config.max_roster {
        Err(LeagueError::RosterFull {
            max: config.max_roster,
        })
    } else {
        Ok(())
    }
}

/// Accepting an invite only needs room among actual members; the invite
/// being accepted was already counted.
pub fn roster_has_member_room(team: &Team, config: &LeagueConfig) -> Result<(), LeagueError> {
    if team.members.len() >= config.max_roster {
        Err(LeagueError::RosterFull {
            max: config.max_roster,
        })
    } else {
        Ok(())
    }
}

pub fn roster_meets_minimum(team: &Team, required: usize) -> Result<(), LeagueError> {
    if team.members.len() < required {
        Err(LeagueError::RosterTooSmall {
            team: team.display_name(),
            required,
        })
    } else {
        Ok(())
    }
}

pub fn captain_slot_available(team: &Team, config: &LeagueConfig) -> Result<(), LeagueError> {
    if team.captain_count() >= config.max_captains {
        Err(LeagueError::CaptainLimit {
            max: config.max_captains,
        })
    } else {
        Ok(())
    }
}

pub fn pilot_invited(team: &Team, pilot_id: u64) -> Result<(), LeagueError> {
    if team.is_invited(pilot_id) {
        Ok(())
    } else {
        Err(LeagueError::NotInvited(team.display_name()))
    }
}

pub fn valid_team_name(name: &str, config: &LeagueConfig) -> Result<String, LeagueError> {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() || name.chars().count() > config.max_team_name_len {
        return Err(LeagueError::InvalidTeamName(format!(
            "Team names must be between 1 and {} characters.",
            config.max_team_name_len
        )));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '\'' | '.');
    if !name.chars().all(allowed) {
        return Err(LeagueError::InvalidTeamName(
            "Team names may only contain letters, numbers, spaces and - _ ' .".to_string(),
        ));
    }
    Ok(name)
}

pub fn valid_team_tag(tag: &str, config: &LeagueConfig) -> Result<String, LeagueError> {
    let tag = tag.trim().to_uppercase();
    if tag.is_empty() || tag.len() > config.max_tag_len || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LeagueError::InvalidTeamTag(format!(
            "Team tags must be 1 to {} letters or numbers.",
            config.max_tag_len
        )));
    }
    Ok(tag)
}

/// Name and tag must not collide with any other active team.
pub fn name_and_tag_unique(
    teams: &[Team],
    name: &str,
    tag: &str,
    ignore_team: Option<u64>,
) -> Result<(), LeagueError> {
    let clash = teams
        .iter()
        .filter(|t| !t.disbanded && Some(t.id) != ignore_team)
        .find_map(|t| {
            if t.name.eq_ignore_ascii_case(name) {
                Some(name.to_string())
            } else if t.tag.eq_ignore_ascii_case(tag) {
                Some(tag.to_string())
            } else {
                None
            }
        });
    match clash {
        Some(taken) => Err(LeagueError::NameTaken(taken)),
        None => Ok(()),
    }
}

// ============================================================================
// MAPS
// ============================================================================

/// Returns the pool's spelling of the map.
/// Map names are compared trimmed, with inner whitespace collapsed.
pub fn normalize_map_name(map: &str) -> String {
    map.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn map_in_pool(pool: &[String], map: &str, game_type: GameType) -> Result<String, LeagueError> {
    let map = normalize_map_name(map);
    pool.iter()
        .find(|m| m.eq_ignore_ascii_case(&map))
        .cloned()
        .ok_or(LeagueError::MapNotInPool { map, game_type })
}

pub fn map_not_home_map(home_set: Option<&HomeMapSet>, map: &str) -> Result<(), LeagueError> {
    match home_set {
        Some(set) if set.maps.iter().any(|m| m.eq_ignore_ascii_case(map)) => {
            Err(LeagueError::MapIsHomeMap(map.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn home_map_set_complete<'a>(
    team: &'a Team,
    game_type: GameType,
    team_size: TeamSize,
    config: &LeagueConfig,
) -> Result<&'a HomeMapSet, LeagueError> {
    match team.home_map_set(game_type, team_size) {
        Some(set) if set.maps.len() == config.home_maps_per_set => Ok(set),
        _ => Err(LeagueError::HomeMapsMissing {
            team: team.display_name(),
            game_type,
            team_size,
            count: config.home_maps_per_set,
        }),
    }
}

/// At least one complete home map set for the game type.
pub fn has_home_maps_for(
    team: &Team,
    game_type: GameType,
    config: &LeagueConfig,
) -> Result<(), LeagueError> {
    let any_complete = team
        .home_maps
        .iter()
        .any(|set| set.game_type == game_type && set.maps.len() == config.home_maps_per_set);
    if any_complete {
        Ok(())
    } else {
        Err(LeagueError::NoHomeMaps {
            team: team.display_name(),
            game_type,
        })
    }
}

/// 1-based option into a home map set.
pub fn home_map_option(set: &HomeMapSet, option: usize) -> Result<String, LeagueError> {
    if option == 0 || option > set.maps.len() {
        return Err(LeagueError::InvalidMapOption {
            max: set.maps.len(),
        });
    }
    Ok(set.maps[option - 1].clone())
}

/// Right count, no duplicates, every map in the pool. Returns pool spellings.
pub fn valid_home_maps(
    maps: &[String],
    pool: &[String],
    game_type: GameType,
    config: &LeagueConfig,
) -> Result<Vec<String>, LeagueError> {
    if maps.len() != config.home_maps_per_set {
        return Err(LeagueError::InvalidHomeMaps(format!(
            "You must provide exactly {} home maps.",
            config.home_maps_per_set
        )));
    }

    let mut resolved: Vec<String> = Vec::with_capacity(maps.len());
    for map in maps {
        let canonical = map_in_pool(pool, map, game_type)?;
        if resolved.iter().any(|m| m == &canonical) {
            return Err(LeagueError::InvalidHomeMaps(format!(
                "`{}` is listed more than once.",
                canonical
            )));
        }
        resolved.push(canonical);
    }
    Ok(resolved)
}

// ============================================================================
// CHALLENGES
// ============================================================================

pub fn challenge_found(challenge: Option<Challenge>, id: u64) -> Result<Challenge, LeagueError> {
    challenge.ok_or(LeagueError::ChallengeNotFound(id))
}

pub fn different_teams(a: &Team, b: &Team) -> Result<(), LeagueError> {
    if a.id == b.id {
        Err(LeagueError::SameTeam)
    } else {
        Ok(())
    }
}

/// No open challenge of this game type between the two teams.
pub fn no_open_challenge_between(
    existing: &[Challenge],
    a: u64,
    b: u64,
    game_type: GameType,
) -> Result<(), LeagueError> {
    match existing
        .iter()
        .find(|c| c.is_open() && c.game_type == game_type && c.involves(a) && c.involves(b))
    {
        Some(c) => Err(LeagueError::OpenChallengeExists {
            id: c.id,
            game_type,
        }),
        None => Ok(()),
    }
}

/// Returns the opposing team's id when `team_id` is a participant.
pub fn participating_team(challenge: &Challenge, team_id: u64) -> Result<u64, LeagueError> {
    challenge
        .opponent_of(team_id)
        .ok_or(LeagueError::NotParticipant(challenge.id))
}

pub fn challenge_not_voided(challenge: &Challenge) -> Result<(), LeagueError> {
    if challenge.voided.is_some() {
        Err(LeagueError::ChallengeVoided(challenge.id))
    } else {
        Ok(())
    }
}

pub fn challenge_open(challenge: &Challenge) -> Result<(), LeagueError> {
    challenge_not_voided(challenge)?;
    if challenge.confirmed_at.is_some() {
        return Err(LeagueError::ChallengeConfirmed(challenge.id));
    }
    Ok(())
}

pub fn challenge_unreported(challenge: &Challenge) -> Result<(), LeagueError> {
    if challenge.report.is_some() {
        Err(LeagueError::AlreadyReported(challenge.id))
    } else {
        Ok(())
    }
}

pub fn challenge_unscheduled(challenge: &Challenge) -> Result<(), LeagueError> {
    if challenge.match_time.is_some() {
        Err(LeagueError::AlreadyScheduled(challenge.id))
    } else {
        Ok(())
    }
}

pub fn challenge_scheduled(challenge: &Challenge) -> Result<DateTime<Utc>, LeagueError> {
    challenge
        .match_time
        .ok_or(LeagueError::NotScheduled(challenge.id))
}

pub fn challenge_confirmed(challenge: &Challenge) -> Result<(), LeagueError> {
    challenge_not_voided(challenge)?;
    if challenge.confirmed_at.is_none() {
        return Err(LeagueError::ChallengeNotConfirmed(challenge.id));
    }
    Ok(())
}

pub fn team_size_set(challenge: &Challenge) -> Result<TeamSize, LeagueError> {
    challenge
        .team_size
        .ok_or(LeagueError::TeamSizeNotSet(challenge.id))
}

pub fn map_set(challenge: &Challenge) -> Result<String, LeagueError> {
    challenge
        .map
        .clone()
        .ok_or(LeagueError::MapNotSet(challenge.id))
}

pub fn is_away_team(challenge: &Challenge, team_id: u64) -> Result<(), LeagueError> {
    if challenge.away_team() == team_id {
        Ok(())
    } else {
        Err(LeagueError::NotAwayTeam)
    }
}

/// The pending suggestion's value, provided the other team made it.
pub fn suggestion_from_opponent<T: Clone>(
    suggestion: Option<&Suggestion<T>>,
    team_id: u64,
    what: &'static str,
) -> Result<T, LeagueError> {
    let suggestion = suggestion.ok_or(LeagueError::NothingToConfirm(what))?;
    if suggestion.team == team_id {
        return Err(LeagueError::OwnSuggestion(what));
    }
    Ok(suggestion.value.clone())
}

pub fn time_in_future(time: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), LeagueError> {
    if time <= now {
        Err(LeagueError::TimeInPast)
    } else {
        Ok(())
    }
}

pub fn clock_deadline_respected(
    challenge: &Challenge,
    time: DateTime<Utc>,
) -> Result<(), LeagueError> {
    match &challenge.clock {
        Some(clock) if time > clock.deadline => Err(LeagueError::PastClockDeadline(
            clock.deadline.format("%Y-%m-%d %H:%M UTC").to_string(),
        )),
        _ => Ok(()),
    }
}

/// A team may clock an unscheduled, unclocked challenge while it has clocks left.
pub fn clock_available(
    challenge: &Challenge,
    team: &Team,
    clocks_used: u32,
    season: &SeasonState,
    config: &LeagueConfig,
) -> Result<(), LeagueError> {
    not_postseason(season)?;
    team_not_penalized(team)?;
    challenge_open(challenge)?;
    challenge_unscheduled(challenge)?;
    if challenge.clock.is_some() {
        return Err(LeagueError::AlreadyClocked(challenge.id));
    }
    if clocks_used >= config.clocks_per_season {
        return Err(LeagueError::ClockLimit {
            limit: config.clocks_per_season,
        });
    }
    Ok(())
}

pub fn challenge_clocked(challenge: &Challenge) -> Result<(), LeagueError> {
    if challenge.clock.is_none() {
        Err(LeagueError::NotClocked(challenge.id))
    } else {
        Ok(())
    }
}

pub fn match_played(challenge: &Challenge, now: DateTime<Utc>) -> Result<(), LeagueError> {
    let time = challenge_scheduled(challenge)?;
    if now < time {
        Err(LeagueError::MatchNotPlayed)
    } else {
        Ok(())
    }
}

/// Highest score a match may record. Anything above is a typo.
pub const MAX_SCORE: u32 = 10_000;

/// Highest kill, assist or death count a single stat line may carry.
pub const MAX_STAT: u32 = 10_000;

fn score_in_range(score: i64) -> Result<u32, LeagueError> {
    if score < 0 {
        return Err(LeagueError::InvalidScore(
            "Scores cannot be negative.".to_string(),
        ));
    }
    u32::try_from(score)
        .ok()
        .filter(|s| *s <= MAX_SCORE)
        .ok_or_else(|| {
            LeagueError::InvalidScore(format!("Scores cannot be higher than {}.", MAX_SCORE))
        })
}

/// The losing (or tied) team reports, so its own score is never higher.
pub fn valid_report_scores(own: i64, opponent: i64) -> Result<(u32, u32), LeagueError> {
    let (own, opponent) = valid_scores(own, opponent)?;
    if own > opponent {
        return Err(LeagueError::InvalidScore(
            "The losing team reports the match. Enter your score first, then the winner's."
                .to_string(),
        ));
    }
    Ok((own, opponent))
}

pub fn valid_scores(a: i64, b: i64) -> Result<(u32, u32), LeagueError> {
    Ok((score_in_range(a)?, score_in_range(b)?))
}

pub fn valid_stat_line(kills: u32, assists: u32, deaths: u32) -> Result<(), LeagueError> {
    if kills.max(assists).max(deaths) > MAX_STAT {
        return Err(LeagueError::InvalidScore(format!(
            "Kills, assists and deaths cannot be higher than {}.",
            MAX_STAT
        )));
    }
    Ok(())
}

pub fn report_from_opponent(challenge: &Challenge, team_id: u64) -> Result<(), LeagueError> {
    let report = challenge
        .report
        .as_ref()
        .ok_or(LeagueError::NoReport(challenge.id))?;
    if report.reporting_team == team_id {
        return Err(LeagueError::OwnReport);
    }
    Ok(())
}

pub fn rematch_allowed(challenge: &Challenge) -> Result<(), LeagueError> {
    challenge_confirmed(challenge)?;
    if !challenge.is_tie() || challenge.rematch_challenge.is_some() {
        return Err(LeagueError::RematchNotAllowed);
    }
    Ok(())
}

pub fn rematch_not_requested(challenge: &Challenge, team_id: u64) -> Result<(), LeagueError> {
    if challenge.rematch_requested_by == Some(team_id) {
        Err(LeagueError::RematchAlreadyRequested)
    } else {
        Ok(())
    }
}

pub fn caster_available(
    challenge: &Challenge,
    caster_team: Option<&Team>,
) -> Result<(), LeagueError> {
    if let Some(team) = caster_team {
        if challenge.involves(team.id) {
            return Err(LeagueError::CasterOnTeam);
        }
    }
    if challenge.caster.is_some() {
        return Err(LeagueError::CasterTaken(challenge.id));
    }
    Ok(())
}

pub fn is_caster(challenge: &Challenge, pilot_id: u64) -> Result<(), LeagueError> {
    if challenge.caster == Some(pilot_id) {
        Ok(())
    } else {
        Err(LeagueError::NotCaster(challenge.id))
    }
}

pub fn pilot_authorized(
    challenge: &Challenge,
    pilot: &Pilot,
    team_id: u64,
) -> Result<(), LeagueError> {
    if challenge.is_authorized(pilot.id, team_id) {
        Ok(())
    } else {
        Err(LeagueError::PilotNotAuthorized(pilot.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::league::league_models::{Clock, Report};
    use chrono::Duration;

    fn team(id: u64, members: usize) -> Team {
        let mut team = Team::new(format!("Team {}", id), format!("T{}", id), id * 100, Utc::now());
        team.id = id;
        for i in 1..members {
            team.members.push(TeamMember {
                pilot_id: id * 100 + i as u64,
                role: TeamRole::Pilot,
                joined_at: Utc::now(),
            });
        }
        team
    }

    fn challenge() -> Challenge {
        let mut c = Challenge::new(1, 1, 2, GameType::TeamAnarchy, 2, Utc::now());
        c.id = 7;
        c
    }

    #[test]
    fn leader_checks() {
        let mut t = team(1, 3);
        t.members[1].role = TeamRole::Captain;
        assert!(pilot_is_founder(&t, 100).is_ok());
        assert_eq!(pilot_is_founder(&t, 101), Err(LeagueError::NotFounder));
        assert_eq!(pilot_is_captain_or_founder(&t, 101), Ok(TeamRole::Captain));
        assert_eq!(
            pilot_is_captain_or_founder(&t, 102),
            Err(LeagueError::NotCaptain)
        );
    }

    #[test]
    fn roster_limits_count_invites() {
        let config = LeagueConfig::default();
        let mut t = team(1, 7);
        assert!(roster_has_room(&t, &config).is_ok());
        t.invites.push(999);
        assert_eq!(
            roster_has_room(&t, &config),
            Err(LeagueError::RosterFull { max: 8 })
        );
        // The invited pilot can still accept.
        assert!(roster_has_member_room(&t, &config).is_ok());
    }

    #[test]
    fn team_names_and_tags() {
        let config = LeagueConfig::default();
        assert_eq!(
            valid_team_name("  The   Flying  Aces ", &config).unwrap(),
            "The Flying Aces"
        );
        assert!(valid_team_name("Bad<Name>", &config).is_err());
        assert!(valid_team_name(&"x".repeat(26), &config).is_err());
        assert_eq!(valid_team_tag("ace", &config).unwrap(), "ACE");
        assert!(valid_team_tag("TOOLONG", &config).is_err());
        assert!(valid_team_tag("A-B", &config).is_err());
    }

    #[test]
    fn uniqueness_ignores_disbanded_teams() {
        let mut existing = team(1, 1);
        assert!(matches!(
            name_and_tag_unique(&[existing.clone()], "team 1", "NEW", None),
            Err(LeagueError::NameTaken(_))
        ));
        assert!(name_and_tag_unique(&[existing.clone()], "team 1", "NEW", Some(1)).is_ok());
        existing.disbanded = true;
        assert!(name_and_tag_unique(&[existing], "team 1", "T1", None).is_ok());
    }

    #[test]
    fn home_maps_must_be_distinct_pool_maps() {
        let config = LeagueConfig::default();
        let pool: Vec<String> = ["Vault", "Foundry", "Backbone", "Fuel"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let maps: Vec<String> = vec!["vault".into(), "FOUNDRY".into(), "Fuel".into()];
        assert_eq!(
            valid_home_maps(&maps, &pool, GameType::TeamAnarchy, &config).unwrap(),
            vec!["Vault", "Foundry", "Fuel"]
        );

        let dupes: Vec<String> = vec!["Vault".into(), "vault".into(), "Fuel".into()];
        assert!(matches!(
            valid_home_maps(&dupes, &pool, GameType::TeamAnarchy, &config),
            Err(LeagueError::InvalidHomeMaps(_))
        ));

        let unknown: Vec<String> = vec!["Vault".into(), "Nope".into(), "Fuel".into()];
        assert!(matches!(
            valid_home_maps(&unknown, &pool, GameType::TeamAnarchy, &config),
            Err(LeagueError::MapNotInPool { .. })
        ));
    }

    #[test]
    fn map_options_are_one_based() {
        let set = HomeMapSet {
            game_type: GameType::TeamAnarchy,
            team_size: TeamSize::TwoVTwo,
            maps: vec!["A".into(), "B".into(), "C".into()],
        };
        assert_eq!(home_map_option(&set, 1).unwrap(), "A");
        assert_eq!(home_map_option(&set, 3).unwrap(), "C");
        assert!(home_map_option(&set, 0).is_err());
        assert!(home_map_option(&set, 4).is_err());
    }

    #[test]
    fn suggestions_must_come_from_the_other_team() {
        let suggestion = Suggestion {
            value: TeamSize::ThreeVThree,
            team: 1,
        };
        assert_eq!(
            suggestion_from_opponent(Some(&suggestion), 2, "team size"),
            Ok(TeamSize::ThreeVThree)
        );
        assert_eq!(
            suggestion_from_opponent(Some(&suggestion), 1, "team size"),
            Err(LeagueError::OwnSuggestion("team size"))
        );
        assert_eq!(
            suggestion_from_opponent::<TeamSize>(None, 1, "team size"),
            Err(LeagueError::NothingToConfirm("team size"))
        );
    }

    #[test]
    fn clock_rules() {
        let config = LeagueConfig::default();
        let season = SeasonState::default();
        let t = team(1, 2);
        let mut c = challenge();

        assert!(clock_available(&c, &t, 0, &season, &config).is_ok());
        assert_eq!(
            clock_available(&c, &t, 2, &season, &config),
            Err(LeagueError::ClockLimit { limit: 2 })
        );

        let post = SeasonState {
            number: 1,
            postseason: true,
        };
        assert_eq!(
            clock_available(&c, &t, 0, &post, &config),
            Err(LeagueError::Postseason)
        );

        let mut penalized = t.clone();
        penalized.penalties = 1;
        assert!(matches!(
            clock_available(&c, &penalized, 0, &season, &config),
            Err(LeagueError::Penalized(_))
        ));

        c.clock = Some(Clock {
            team: 1,
            clocked_at: Utc::now(),
            deadline: Utc::now() + Duration::days(28),
        });
        assert_eq!(
            clock_available(&c, &t, 0, &season, &config),
            Err(LeagueError::AlreadyClocked(7))
        );
        assert!(clock_deadline_respected(&c, Utc::now() + Duration::days(1)).is_ok());
        assert!(clock_deadline_respected(&c, Utc::now() + Duration::days(30)).is_err());
    }

    #[test]
    fn report_scores() {
        assert_eq!(valid_report_scores(10, 20), Ok((10, 20)));
        assert_eq!(valid_report_scores(15, 15), Ok((15, 15)));
        assert!(valid_report_scores(20, 10).is_err());
        assert!(valid_report_scores(-1, 10).is_err());
        assert!(valid_report_scores(10, 10_001).is_err());
        assert!(valid_report_scores(10, 3_000_000_000).is_err());
    }

    #[test]
    fn forced_scores_and_stat_lines_are_bounded() {
        assert_eq!(valid_scores(MAX_SCORE as i64, 0), Ok((MAX_SCORE, 0)));
        assert!(matches!(
            valid_scores(3_000_000_000, 0),
            Err(LeagueError::InvalidScore(_))
        ));
        assert!(valid_stat_line(25, 10, 8).is_ok());
        assert!(valid_stat_line(0, MAX_STAT + 1, 0).is_err());
    }

    #[test]
    fn confirming_requires_the_other_team() {
        let mut c = challenge();
        assert_eq!(report_from_opponent(&c, 2), Err(LeagueError::NoReport(7)));
        c.report = Some(Report {
            reporting_team: 1,
            challenging_score: 3,
            challenged_score: 5,
            reported_at: Utc::now(),
        });
        assert_eq!(report_from_opponent(&c, 1), Err(LeagueError::OwnReport));
        assert!(report_from_opponent(&c, 2).is_ok());
    }

    #[test]
    fn rematch_only_after_confirmed_tie() {
        let mut c = challenge();
        c.report = Some(Report {
            reporting_team: 1,
            challenging_score: 5,
            challenged_score: 5,
            reported_at: Utc::now(),
        });
        assert_eq!(rematch_allowed(&c), Err(LeagueError::ChallengeNotConfirmed(7)));
        c.confirmed_at = Some(Utc::now());
        assert!(rematch_allowed(&c).is_ok());
        if let Some(report) = c.report.as_mut() {
            report.challenged_score = 6;
        }
        assert_eq!(rematch_allowed(&c), Err(LeagueError::RematchNotAllowed));
    }

    #[test]
    fn casters_cannot_be_participants() {
        let c = challenge();
        let participant = team(1, 2);
        let outsider = team(3, 2);
        assert_eq!(
            caster_available(&c, Some(&participant)),
            Err(LeagueError::CasterOnTeam)
        );
        assert!(caster_available(&c, Some(&outsider)).is_ok());
        assert!(caster_available(&c, None).is_ok());
    }
}
