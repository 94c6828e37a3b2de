// Team management - rosters, invites, leadership, home maps and admin actions.
//
// Like every core service this has no Discord code in it: commands hand us
// pilot ids and names, we hand back the updated team or a warning.

use crate::core::league::validation as check;
use crate::core::league::{
    GameType, HomeMapSet, LeagueConfig, LeagueError, LeagueStore, Pilot, Team, TeamMember,
    TeamRole, TeamSize, Void,
};
use chrono::Utc;
use std::sync::Arc;

/// A roster line with the pilot's current name resolved.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub pilot: Pilot,
    pub role: TeamRole,
}

/// Result of disbanding: the team plus the challenges that were voided.
#[derive(Debug, Clone)]
pub struct DisbandOutcome {
    pub team: Team,
    pub voided_challenges: Vec<u64>,
}

pub struct TeamService<S: LeagueStore> {
    store: Arc<S>,
    config: LeagueConfig,
}

impl<S: LeagueStore> TeamService<S> {
    pub fn new(store: Arc<S>, config: LeagueConfig) -> Self {
        Self { store, config }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Create or refresh the pilot record for a Discord user.
    pub async fn ensure_pilot(&self, pilot_id: u64, name: &str) -> Result<Pilot, LeagueError> {
        match self.store.get_pilot(pilot_id).await? {
            Some(mut pilot) => {
                if pilot.name != name {
                    pilot.name = name.to_string();
                    self.store.save_pilot(&pilot).await?;
                }
                Ok(pilot)
            }
            None => {
                let pilot = Pilot {
                    id: pilot_id,
                    name: name.to_string(),
                    timezone: None,
                };
                self.store.save_pilot(&pilot).await?;
                Ok(pilot)
            }
        }
    }

    pub async fn team_for_pilot(&self, pilot_id: u64) -> Result<Option<Team>, LeagueError> {
        self.store.find_team_for_pilot(pilot_id).await
    }

    pub async fn get_team(&self, team_id: u64) -> Result<Team, LeagueError> {
        check::team_found(self.store.get_team(team_id).await?, &team_id.to_string())
    }

    pub async fn get_pilot(&self, pilot_id: u64) -> Result<Option<Pilot>, LeagueError> {
        self.store.get_pilot(pilot_id).await
    }

    pub async fn find_team(&self, name_or_tag: &str) -> Result<Team, LeagueError> {
        check::team_found(self.store.find_team(name_or_tag).await?, name_or_tag)
    }

    pub async fn list_active_teams(&self) -> Result<Vec<Team>, LeagueError> {
        let mut teams: Vec<Team> = self
            .store
            .list_teams()
            .await?
            .into_iter()
            .filter(|t| !t.disbanded)
            .collect();
        teams.sort_by_key(|t| t.name.to_lowercase());
        Ok(teams)
    }

    pub async fn roster(&self, team: &Team) -> Result<Vec<RosterEntry>, LeagueError> {
        let mut entries = Vec::with_capacity(team.members.len());
        for member in &team.members {
            let pilot = self
                .store
                .get_pilot(member.pilot_id)
                .await?
                .unwrap_or_else(|| Pilot {
                    id: member.pilot_id,
                    name: format!("<@{}>", member.pilot_id),
                    timezone: None,
                });
            entries.push(RosterEntry {
                pilot,
                role: member.role,
            });
        }
        entries.sort_by_key(|e| {
            let rank = match e.role {
                TeamRole::Founder => 0,
                TeamRole::Captain => 1,
                TeamRole::Pilot => 2,
            };
            (rank, e.pilot.name.to_lowercase())
        });
        Ok(entries)
    }

    pub async fn pending_invites(&self, pilot_id: u64) -> Result<Vec<Team>, LeagueError> {
        Ok(self
            .store
            .list_teams()
            .await?
            .into_iter()
            .filter(|t| !t.disbanded && t.is_invited(pilot_id))
            .collect())
    }

    async fn leader_team(&self, actor: u64) -> Result<Team, LeagueError> {
        let team = check::pilot_on_team(self.store.find_team_for_pilot(actor).await?)?;
        check::pilot_is_captain_or_founder(&team, actor)?;
        Ok(team)
    }

    async fn founder_team(&self, actor: u64) -> Result<Team, LeagueError> {
        let team = check::pilot_on_team(self.store.find_team_for_pilot(actor).await?)?;
        check::pilot_is_founder(&team, actor)?;
        Ok(team)
    }

    // ------------------------------------------------------------------
    // Founding & membership
    // ------------------------------------------------------------------

    pub async fn create_team(
        &self,
        founder: &Pilot,
        name: &str,
        tag: &str,
    ) -> Result<Team, LeagueError> {
        check::not_postseason(&self.store.get_season().await?)?;
        let existing = self.store.find_team_for_pilot(founder.id).await?;
        check::pilot_not_on_team(founder, existing.as_ref())?;
        let name = check::valid_team_name(name, &self.config)?;
        let tag = check::valid_team_tag(tag, &self.config)?;
        check::name_and_tag_unique(&self.store.list_teams().await?, &name, &tag, None)?;

        // A new team clears any invites the founder was holding.
        self.clear_invites_for(founder.id, None).await?;

        let team = self
            .store
            .insert_team(Team::new(name, tag, founder.id, Utc::now()))
            .await?;
        tracing::info!(team_id = team.id, founder = founder.id, "Team created");
        Ok(team)
    }

    pub async fn invite_pilot(&self, actor: u64, pilot: &Pilot) -> Result<Team, LeagueError> {
        let mut team = self.leader_team(actor).await?;
        check::team_active(&team)?;
        check::team_unlocked(&team)?;
        let pilot_team = self.store.find_team_for_pilot(pilot.id).await?;
        check::pilot_not_on_team(pilot, pilot_team.as_ref())?;
        if team.is_invited(pilot.id) {
            return Err(LeagueError::AlreadyInvited(pilot.name.clone()));
        }
        check::roster_has_room(&team, &self.config)?;

        team.invites.push(pilot.id);
        self.store.save_team(&team).await?;
        tracing::info!(team_id = team.id, pilot_id = pilot.id, "Pilot invited");
        Ok(team)
    }

    pub async fn cancel_invite(&self, actor: u64, pilot: &Pilot) -> Result<Team, LeagueError> {
        let mut team = self.leader_team(actor).await?;
        if !team.is_invited(pilot.id) {
            return Err(LeagueError::NotInvited(team.display_name()));
        }
        team.invites.retain(|id| *id != pilot.id);
        self.store.save_team(&team).await?;
        Ok(team)
    }

    pub async fn accept_invite(&self, pilot: &Pilot, team_query: &str) -> Result<Team, LeagueError> {
        check::not_postseason(&self.store.get_season().await?)?;
        let mut team = self.find_team(team_query).await?;
        check::pilot_invited(&team, pilot.id)?;
        check::team_active(&team)?;
        check::team_unlocked(&team)?;
        let current = self.store.find_team_for_pilot(pilot.id).await?;
        check::pilot_not_on_team(pilot, current.as_ref())?;
        check::roster_has_member_room(&team, &self.config)?;

        team.invites.retain(|id| *id != pilot.id);
        team.members.push(TeamMember {
            pilot_id: pilot.id,
            role: TeamRole::Pilot,
            joined_at: Utc::now(),
        });
        self.store.save_team(&team).await?;
        self.clear_invites_for(pilot.id, Some(team.id)).await?;

        tracing::info!(team_id = team.id, pilot_id = pilot.id, "Pilot joined team");
        Ok(team)
    }

    pub async fn decline_invite(&self, pilot: &Pilot, team_query: &str) -> Result<Team, LeagueError> {
        let mut team = self.find_team(team_query).await?;
        check::pilot_invited(&team, pilot.id)?;
        team.invites.retain(|id| *id != pilot.id);
        self.store.save_team(&team).await?;
        Ok(team)
    }

    pub async fn leave_team(&self, pilot: &Pilot) -> Result<Team, LeagueError> {
        check::not_postseason(&self.store.get_season().await?)?;
        let mut team = check::pilot_on_team(self.store.find_team_for_pilot(pilot.id).await?)?;
        if team.role_of(pilot.id) == Some(TeamRole::Founder) {
            return Err(LeagueError::FounderCannotLeave);
        }
        check::team_unlocked(&team)?;

        team.members.retain(|m| m.pilot_id != pilot.id);
        self.store.save_team(&team).await?;
        tracing::info!(team_id = team.id, pilot_id = pilot.id, "Pilot left team");
        Ok(team)
    }

    pub async fn remove_pilot(&self, actor: u64, target: &Pilot) -> Result<Team, LeagueError> {
        check::not_self(actor, target.id)?;
        let mut team = self.leader_team(actor).await?;
        check::team_unlocked(&team)?;
        let member = check::member_of(&team, target)?;
        let actor_role = team.role_of(actor);
        if actor_role != Some(TeamRole::Founder) && member.role.is_leader() {
            return Err(LeagueError::CannotRemoveLeader);
        }

        team.members.retain(|m| m.pilot_id != target.id);
        self.store.save_team(&team).await?;
        tracing::info!(team_id = team.id, pilot_id = target.id, "Pilot removed from team");
        Ok(team)
    }

    // ------------------------------------------------------------------
    // Leadership
    // ------------------------------------------------------------------

    pub async fn make_captain(&self, actor: u64, target: &Pilot) -> Result<Team, LeagueError> {
        check::not_self(actor, target.id)?;
        let mut team = self.founder_team(actor).await?;
        let role = check::member_of(&team, target)?.role;
        if role == TeamRole::Captain {
            return Err(LeagueError::AlreadyCaptain(target.name.clone()));
        }
        check::captain_slot_available(&team, &self.config)?;

        if let Some(member) = team.member_mut(target.id) {
            member.role = TeamRole::Captain;
        }
        self.store.save_team(&team).await?;
        Ok(team)
    }

    pub async fn remove_captain(&self, actor: u64, target: &Pilot) -> Result<Team, LeagueError> {
        let mut team = self.founder_team(actor).await?;
        let role = check::member_of(&team, target)?.role;
        if role != TeamRole::Captain {
            return Err(LeagueError::NotACaptain(target.name.clone()));
        }

        if let Some(member) = team.member_mut(target.id) {
            member.role = TeamRole::Pilot;
        }
        self.store.save_team(&team).await?;
        Ok(team)
    }

    /// Hand the team to another member; the old founder stays on as captain
    /// when a captain slot is free.
    pub async fn transfer_founder(&self, actor: u64, target: &Pilot) -> Result<Team, LeagueError> {
        check::not_self(actor, target.id)?;
        let mut team = self.founder_team(actor).await?;
        let target_role = check::member_of(&team, target)?.role;

        // The target's captain slot frees up as they become founder.
        let captains_after = team.captain_count() - usize::from(target_role == TeamRole::Captain);
        let old_founder_role = if captains_after < self.config.max_captains {
            TeamRole::Captain
        } else {
            TeamRole::Pilot
        };

        if let Some(member) = team.member_mut(actor) {
            member.role = old_founder_role;
        }
        if let Some(member) = team.member_mut(target.id) {
            member.role = TeamRole::Founder;
        }
        self.store.save_team(&team).await?;
        tracing::info!(team_id = team.id, founder = target.id, "Team founder transferred");
        Ok(team)
    }

    /// Disband the actor's team, voiding every challenge it still has open.
    pub async fn disband_team(&self, actor: u64) -> Result<DisbandOutcome, LeagueError> {
        let mut team = self.founder_team(actor).await?;

        let now = Utc::now();
        let mut voided_challenges = Vec::new();
        for mut challenge in self.store.list_challenges_for_team(team.id).await? {
            if challenge.is_open() {
                challenge.voided = Some(Void {
                    at: now,
                    reason: "Team disbanded".to_string(),
                });
                self.store.save_challenge(&challenge).await?;
                voided_challenges.push(challenge.id);
            }
        }

        team.disbanded = true;
        team.members.clear();
        team.invites.clear();
        self.store.save_team(&team).await?;

        tracing::info!(
            team_id = team.id,
            voided = voided_challenges.len(),
            "Team disbanded"
        );
        Ok(DisbandOutcome {
            team,
            voided_challenges,
        })
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub async fn set_home_maps(
        &self,
        actor: u64,
        game_type: GameType,
        team_size: TeamSize,
        maps: Vec<String>,
    ) -> Result<Team, LeagueError> {
        let mut team = self.leader_team(actor).await?;
        let pool = self.store.list_maps(game_type).await?;
        let maps = check::valid_home_maps(&maps, &pool, game_type, &self.config)?;

        // Home maps are locked while an away team still has to pick from them.
        let waiting = self
            .store
            .list_challenges_for_team(team.id)
            .await?
            .into_iter()
            .find(|c| {
                c.is_open()
                    && c.home_map_team == team.id
                    && c.game_type == game_type
                    && c.map.is_none()
            });
        if let Some(challenge) = waiting {
            return Err(LeagueError::HomeMapsLocked(challenge.id));
        }

        team.home_maps
            .retain(|set| !(set.game_type == game_type && set.team_size == team_size));
        team.home_maps.push(HomeMapSet {
            game_type,
            team_size,
            maps,
        });
        self.store.save_team(&team).await?;
        Ok(team)
    }

    pub async fn set_team_timezone(&self, actor: u64, timezone: &str) -> Result<Team, LeagueError> {
        let mut team = self.leader_team(actor).await?;
        if !crate::core::league::valid_timezone(timezone) {
            return Err(LeagueError::InvalidTimezone(timezone.to_string()));
        }
        team.timezone = Some(timezone.trim().to_string());
        self.store.save_team(&team).await?;
        Ok(team)
    }

    pub async fn set_pilot_timezone(
        &self,
        pilot: &Pilot,
        timezone: &str,
    ) -> Result<Pilot, LeagueError> {
        if !crate::core::league::valid_timezone(timezone) {
            return Err(LeagueError::InvalidTimezone(timezone.to_string()));
        }
        let mut pilot = pilot.clone();
        pilot.timezone = Some(timezone.trim().to_string());
        self.store.save_pilot(&pilot).await?;
        Ok(pilot)
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub async fn rename_team(&self, team_query: &str, name: &str) -> Result<Team, LeagueError> {
        let mut team = self.find_team(team_query).await?;
        let name = check::valid_team_name(name, &self.config)?;
        check::name_and_tag_unique(&self.store.list_teams().await?, &name, "", Some(team.id))?;
        team.name = name;
        self.store.save_team(&team).await?;
        Ok(team)
    }

    pub async fn retag_team(&self, team_query: &str, tag: &str) -> Result<Team, LeagueError> {
        let mut team = self.find_team(team_query).await?;
        let tag = check::valid_team_tag(tag, &self.config)?;
        check::name_and_tag_unique(&self.store.list_teams().await?, "", &tag, Some(team.id))?;
        team.tag = tag;
        self.store.save_team(&team).await?;
        Ok(team)
    }

    pub async fn penalize_team(&self, team_query: &str) -> Result<Team, LeagueError> {
        let mut team = self.find_team(team_query).await?;
        check::team_active(&team)?;
        team.penalties += 1;
        self.store.save_team(&team).await?;
        tracing::warn!(team_id = team.id, penalties = team.penalties, "Team penalized");
        Ok(team)
    }

    pub async fn set_locked(&self, team_query: &str, locked: bool) -> Result<Team, LeagueError> {
        let mut team = self.find_team(team_query).await?;
        team.locked = locked;
        self.store.save_team(&team).await?;
        tracing::info!(team_id = team.id, locked, "Team roster lock changed");
        Ok(team)
    }

    /// Bring a disbanded team back with a new founder.
    pub async fn reinstate_team(&self, team_query: &str, founder: &Pilot) -> Result<Team, LeagueError> {
        let mut team = self.find_team(team_query).await?;
        if !team.disbanded {
            return Err(LeagueError::TeamNotDisbanded(team.display_name()));
        }
        let current = self.store.find_team_for_pilot(founder.id).await?;
        check::pilot_not_on_team(founder, current.as_ref())?;
        check::name_and_tag_unique(
            &self.store.list_teams().await?,
            &team.name,
            &team.tag,
            Some(team.id),
        )?;

        team.disbanded = false;
        team.members = vec![TeamMember {
            pilot_id: founder.id,
            role: TeamRole::Founder,
            joined_at: Utc::now(),
        }];
        self.store.save_team(&team).await?;
        self.clear_invites_for(founder.id, None).await?;
        tracing::info!(team_id = team.id, founder = founder.id, "Team reinstated");
        Ok(team)
    }

    /// Drop the pilot's invites from every team except `keep`.
    async fn clear_invites_for(&self, pilot_id: u64, keep: Option<u64>) -> Result<(), LeagueError> {
        for mut team in self.store.list_teams().await? {
            if Some(team.id) != keep && team.is_invited(pilot_id) {
                team.invites.retain(|id| *id != pilot_id);
                self.store.save_team(&team).await?;
            }
        }
        Ok(())
    }
}
