use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Team, TeamMember, TeamRole, team_members, teams,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    async fn team_admin_count(&self, db: &DatabaseTransaction, team_id: Uuid) -> ResultEngine<u64> {
        team_members::Entity::find()
            .filter(team_members::Column::TeamId.eq(team_id.to_string()))
            .filter(team_members::Column::Role.eq(TeamRole::Admin.as_str()))
            .count(db)
            .await
            .map_err(Into::into)
    }

    async fn require_team_member_row(
        &self,
        db: &DatabaseTransaction,
        team_id: Uuid,
        member: &str,
    ) -> ResultEngine<TeamMember> {
        let model = team_members::Entity::find_by_id((team_id.to_string(), member.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;
        TeamMember::try_from(model)
    }

    /// Create a team; the creator becomes its admin. Inside an organization
    /// the creator must be an owner/admin of it.
    pub async fn create_team(
        &self,
        username: &str,
        name: &str,
        description: Option<&str>,
        organization_id: Option<Uuid>,
    ) -> ResultEngine<Team> {
        let name = normalize_required_text(name, "team name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, username).await?;
            if let Some(organization_id) = organization_id {
                self.require_organization_manager(&db_tx, organization_id, username)
                    .await?;
            }
            let now = Utc::now();
            let team = Team {
                id: Uuid::new_v4(),
                organization_id,
                name,
                description: normalize_optional_text(description),
                created_by: username.to_string(),
                created_at: now,
            };
            teams::ActiveModel::from(&team).insert(&db_tx).await?;
            let admin = TeamMember {
                team_id: team.id,
                user_id: username.to_string(),
                role: TeamRole::Admin,
                created_at: now,
            };
            team_members::ActiveModel::from(&admin)
                .insert(&db_tx)
                .await?;
            Ok(team)
        })
    }

    /// Teams the caller belongs to.
    pub async fn list_teams(&self, username: &str) -> ResultEngine<Vec<Team>> {
        with_tx!(self, |db_tx| {
            let ids: Vec<String> = team_members::Entity::find()
                .filter(team_members::Column::UserId.eq(username))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.team_id)
                .collect();
            let rows = teams::Entity::find()
                .filter(teams::Column::Id.is_in(ids))
                .order_by_asc(teams::Column::Name)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Team::try_from).collect()
        })
    }

    pub async fn team_members(&self, username: &str, team_id: Uuid) -> ResultEngine<Vec<TeamMember>> {
        with_tx!(self, |db_tx| {
            self.require_team_reader(&db_tx, team_id, username).await?;
            let rows = team_members::Entity::find()
                .filter(team_members::Column::TeamId.eq(team_id.to_string()))
                .order_by_asc(team_members::Column::UserId)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(TeamMember::try_from).collect()
        })
    }

    /// Add a new member (team manager only).
    pub async fn add_team_member(
        &self,
        username: &str,
        team_id: Uuid,
        member: &str,
        role: TeamRole,
    ) -> ResultEngine<TeamMember> {
        with_tx!(self, |db_tx| {
            let team = self.require_team_manager(&db_tx, team_id, username).await?;
            self.require_user(&db_tx, member).await?;
            if self.team_role(&db_tx, team_id, member).await?.is_some() {
                return Err(EngineError::ExistingKey(format!("{member} in team {team_id}")));
            }
            // Organization teams only take organization members.
            if let Some(organization_id) = team.organization_id
                && self
                    .organization_role(&db_tx, organization_id, member)
                    .await?
                    .is_none()
            {
                return Err(EngineError::InvalidState(format!(
                    "{member} is not a member of the team's organization"
                )));
            }
            let membership = TeamMember {
                team_id,
                user_id: member.to_string(),
                role,
                created_at: Utc::now(),
            };
            team_members::ActiveModel::from(&membership)
                .insert(&db_tx)
                .await?;
            Ok(membership)
        })
    }

    /// Change a member's role. The last admin cannot be demoted.
    pub async fn update_team_member_role(
        &self,
        username: &str,
        team_id: Uuid,
        member: &str,
        role: TeamRole,
    ) -> ResultEngine<TeamMember> {
        with_tx!(self, |db_tx| {
            self.require_team_manager(&db_tx, team_id, username).await?;
            let mut membership = self.require_team_member_row(&db_tx, team_id, member).await?;
            if membership.role == TeamRole::Admin
                && role != TeamRole::Admin
                && self.team_admin_count(&db_tx, team_id).await? <= 1
            {
                return Err(EngineError::InvalidState(
                    "cannot demote the last team admin".to_string(),
                ));
            }
            membership.role = role;
            team_members::ActiveModel::from(&membership)
                .update(&db_tx)
                .await?;
            Ok(membership)
        })
    }

    /// Remove a member (team manager, or the member themself). The last
    /// admin cannot be removed.
    pub async fn remove_team_member(
        &self,
        username: &str,
        team_id: Uuid,
        member: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if member != username {
                self.require_team_manager(&db_tx, team_id, username).await?;
            } else {
                self.require_team(&db_tx, team_id).await?;
            }
            let membership = self.require_team_member_row(&db_tx, team_id, member).await?;
            if membership.role == TeamRole::Admin
                && self.team_admin_count(&db_tx, team_id).await? <= 1
            {
                return Err(EngineError::InvalidState(
                    "cannot remove the last team admin".to_string(),
                ));
            }
            team_members::Entity::delete_by_id((team_id.to_string(), member.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

