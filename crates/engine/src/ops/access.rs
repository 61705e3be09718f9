//! Lookups and authorization checks shared by every operation.
//!
//! `require_*` helpers fail with `KeyNotFound`/`Forbidden`; `has_*` helpers
//! answer a yes/no question without failing on missing rows.

use std::collections::HashSet;

use sea_orm::{Condition, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Bid, Contract, EngineError, OrgRole, Organization, Permission, ResultEngine, Rfq, RfqStatus,
    SubjectKind, Team, TeamRole, User, acl_assignments, acl_rules, bids, contracts,
    organization_members, organizations, resource_permissions, rfqs, team_members, teams, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    pub(super) async fn is_platform_admin(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<bool> {
        let user = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?;
        Ok(user.is_some_and(|u| u.role == "admin"))
    }

    pub(super) async fn require_platform_admin(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        if !self.is_platform_admin(db, username).await? {
            return Err(EngineError::Forbidden("admin role required".to_string()));
        }
        Ok(())
    }

    pub(super) async fn require_rfq(&self, db: &DatabaseTransaction, id: Uuid) -> ResultEngine<Rfq> {
        let model = rfqs::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("rfq not exists".to_string()))?;
        Rfq::try_from(model)
    }

    /// Drafts are private to their owner (and platform admins).
    pub(super) async fn require_rfq_visible(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
        username: &str,
    ) -> ResultEngine<Rfq> {
        let rfq = self.require_rfq(db, id).await?;
        if rfq.status == RfqStatus::Draft
            && rfq.user_id != username
            && !self.is_platform_admin(db, username).await?
        {
            return Err(EngineError::KeyNotFound("rfq not exists".to_string()));
        }
        Ok(rfq)
    }

    pub(super) async fn require_rfq_owner(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
        username: &str,
    ) -> ResultEngine<Rfq> {
        let rfq = self.require_rfq_visible(db, id, username).await?;
        if rfq.user_id != username {
            return Err(EngineError::Forbidden("not the rfq owner".to_string()));
        }
        Ok(rfq)
    }

    pub(super) async fn require_bid(&self, db: &DatabaseTransaction, id: Uuid) -> ResultEngine<Bid> {
        let model = bids::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bid not exists".to_string()))?;
        Bid::try_from(model)
    }

    pub(super) async fn require_contract_party(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
        username: &str,
    ) -> ResultEngine<Contract> {
        let model = contracts::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("contract not exists".to_string()))?;
        let contract = Contract::try_from(model)?;
        if !contract.is_party(username) && !self.is_platform_admin(db, username).await? {
            return Err(EngineError::Forbidden("not a contract party".to_string()));
        }
        Ok(contract)
    }

    pub(super) async fn require_organization(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<Organization> {
        let model = organizations::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("organization not exists".to_string()))?;
        Organization::try_from(model)
    }

    pub(super) async fn organization_role(
        &self,
        db: &DatabaseTransaction,
        organization_id: Uuid,
        username: &str,
    ) -> ResultEngine<Option<OrgRole>> {
        let row = organization_members::Entity::find_by_id((
            organization_id.to_string(),
            username.to_string(),
        ))
        .one(db)
        .await?;
        row.as_ref()
            .map(|m| OrgRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Owner/admin of the organization, or a platform admin.
    ///
    /// Returns the caller's effective role; platform admins act as `Admin`.
    pub(super) async fn require_organization_manager(
        &self,
        db: &DatabaseTransaction,
        organization_id: Uuid,
        username: &str,
    ) -> ResultEngine<(Organization, OrgRole)> {
        let organization = self.require_organization(db, organization_id).await?;
        match self.organization_role(db, organization_id, username).await? {
            Some(role) if role.can_manage() => Ok((organization, role)),
            _ if self.is_platform_admin(db, username).await? => Ok((organization, OrgRole::Admin)),
            _ => Err(EngineError::Forbidden(
                "organization owner or admin required".to_string(),
            )),
        }
    }

    pub(super) async fn require_organization_member(
        &self,
        db: &DatabaseTransaction,
        organization_id: Uuid,
        username: &str,
    ) -> ResultEngine<Organization> {
        let organization = self.require_organization(db, organization_id).await?;
        if self
            .organization_role(db, organization_id, username)
            .await?
            .is_none()
            && !self.is_platform_admin(db, username).await?
        {
            return Err(EngineError::Forbidden(
                "not an organization member".to_string(),
            ));
        }
        Ok(organization)
    }

    pub(super) async fn require_team(&self, db: &DatabaseTransaction, id: Uuid) -> ResultEngine<Team> {
        let model = teams::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("team not exists".to_string()))?;
        Team::try_from(model)
    }

    pub(super) async fn team_role(
        &self,
        db: &DatabaseTransaction,
        team_id: Uuid,
        username: &str,
    ) -> ResultEngine<Option<TeamRole>> {
        let row = team_members::Entity::find_by_id((team_id.to_string(), username.to_string()))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| TeamRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Team admin, owner/admin of the team's organization, or a platform admin.
    pub(super) async fn has_team_manage_access(
        &self,
        db: &DatabaseTransaction,
        team: &Team,
        username: &str,
    ) -> ResultEngine<bool> {
        if self.team_role(db, team.id, username).await? == Some(TeamRole::Admin) {
            return Ok(true);
        }
        if let Some(organization_id) = team.organization_id
            && self
                .organization_role(db, organization_id, username)
                .await?
                .is_some_and(OrgRole::can_manage)
        {
            return Ok(true);
        }
        self.is_platform_admin(db, username).await
    }

    pub(super) async fn require_team_manager(
        &self,
        db: &DatabaseTransaction,
        team_id: Uuid,
        username: &str,
    ) -> ResultEngine<Team> {
        let team = self.require_team(db, team_id).await?;
        if !self.has_team_manage_access(db, &team, username).await? {
            return Err(EngineError::Forbidden("team admin required".to_string()));
        }
        Ok(team)
    }

    pub(super) async fn require_team_reader(
        &self,
        db: &DatabaseTransaction,
        team_id: Uuid,
        username: &str,
    ) -> ResultEngine<Team> {
        let team = self.require_team(db, team_id).await?;
        if self.team_role(db, team_id, username).await?.is_some()
            || self.has_team_manage_access(db, &team, username).await?
        {
            return Ok(team);
        }
        Err(EngineError::Forbidden("not a team member".to_string()))
    }

    /// Every subject a user acts as: themself, their teams and organizations.
    async fn subjects_of(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<Vec<(SubjectKind, String)>> {
        let mut subjects = vec![(SubjectKind::User, username.to_string())];
        let team_rows = team_members::Entity::find()
            .filter(team_members::Column::UserId.eq(username.to_string()))
            .all(db)
            .await?;
        subjects.extend(
            team_rows
                .into_iter()
                .map(|row| (SubjectKind::Team, row.team_id)),
        );
        let org_rows = organization_members::Entity::find()
            .filter(organization_members::Column::UserId.eq(username.to_string()))
            .all(db)
            .await?;
        subjects.extend(
            org_rows
                .into_iter()
                .map(|row| (SubjectKind::Organization, row.organization_id)),
        );
        Ok(subjects)
    }

    fn subject_condition(
        kind_col: impl ColumnTrait,
        id_col: impl ColumnTrait,
        subjects: &[(SubjectKind, String)],
    ) -> Condition {
        subjects
            .iter()
            .fold(Condition::any(), |cond, (kind, id)| {
                cond.add(
                    Condition::all()
                        .add(kind_col.eq(kind.as_str()))
                        .add(id_col.eq(id.as_str())),
                )
            })
    }

    /// Whether `username` holds `permission` on `resource_type` (optionally a
    /// single resource), through a direct grant or an assigned ACL rule.
    pub(super) async fn has_permission(
        &self,
        db: &DatabaseTransaction,
        username: &str,
        resource_type: &str,
        permission: Permission,
        resource_id: Option<&str>,
    ) -> ResultEngine<bool> {
        if self.is_platform_admin(db, username).await? {
            return Ok(true);
        }
        let subjects = self.subjects_of(db, username).await?;
        let wanted = [permission.as_str(), Permission::Manage.as_str()];

        let mut scope = Condition::any().add(resource_permissions::Column::ResourceId.is_null());
        if let Some(resource_id) = resource_id {
            scope = scope.add(resource_permissions::Column::ResourceId.eq(resource_id));
        }
        let direct = resource_permissions::Entity::find()
            .filter(resource_permissions::Column::ResourceType.eq(resource_type))
            .filter(resource_permissions::Column::Permission.is_in(wanted))
            .filter(scope)
            .filter(Self::subject_condition(
                resource_permissions::Column::SubjectKind,
                resource_permissions::Column::SubjectId,
                &subjects,
            ))
            .one(db)
            .await?;
        if direct.is_some() {
            return Ok(true);
        }

        let assignments = acl_assignments::Entity::find()
            .filter(Self::subject_condition(
                acl_assignments::Column::SubjectKind,
                acl_assignments::Column::SubjectId,
                &subjects,
            ))
            .all(db)
            .await?;
        let acl_ids: HashSet<String> = assignments.into_iter().map(|a| a.acl_id).collect();
        if acl_ids.is_empty() {
            return Ok(false);
        }
        let rule = acl_rules::Entity::find()
            .filter(acl_rules::Column::AclId.is_in(acl_ids))
            .filter(acl_rules::Column::ResourceType.eq(resource_type))
            .filter(acl_rules::Column::Permission.is_in(wanted))
            .one(db)
            .await?;
        Ok(rule.is_some())
    }
}
