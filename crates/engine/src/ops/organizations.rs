use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, OrgRole, Organization, OrganizationMember, ResultEngine, organization_members,
    organizations,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create an organization; the creator becomes its owner.
    pub async fn create_organization(
        &self,
        username: &str,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<Organization> {
        let name = normalize_required_text(name, "organization name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, username).await?;
            let now = Utc::now();
            let organization = Organization {
                id: Uuid::new_v4(),
                name,
                description: normalize_optional_text(description),
                owner_id: username.to_string(),
                created_at: now,
            };
            organizations::ActiveModel::from(&organization)
                .insert(&db_tx)
                .await?;
            let owner = OrganizationMember {
                organization_id: organization.id,
                user_id: username.to_string(),
                role: OrgRole::Owner,
                created_at: now,
            };
            organization_members::ActiveModel::from(&owner)
                .insert(&db_tx)
                .await?;
            Ok(organization)
        })
    }

    /// Organizations the caller belongs to.
    pub async fn list_organizations(&self, username: &str) -> ResultEngine<Vec<Organization>> {
        with_tx!(self, |db_tx| {
            let ids: Vec<String> = organization_members::Entity::find()
                .filter(organization_members::Column::UserId.eq(username))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.organization_id)
                .collect();
            let rows = organizations::Entity::find()
                .filter(organizations::Column::Id.is_in(ids))
                .order_by_asc(organizations::Column::Name)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Organization::try_from).collect()
        })
    }

    pub async fn organization_members(
        &self,
        username: &str,
        organization_id: Uuid,
    ) -> ResultEngine<Vec<OrganizationMember>> {
        with_tx!(self, |db_tx| {
            self.require_organization_member(&db_tx, organization_id, username)
                .await?;
            let rows = organization_members::Entity::find()
                .filter(organization_members::Column::OrganizationId.eq(organization_id.to_string()))
                .order_by_asc(organization_members::Column::UserId)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(OrganizationMember::try_from).collect()
        })
    }

    /// Add a member or change their role (owner/admin only). Granting or
    /// taking away `owner` requires being an owner; the founding owner's
    /// role is fixed.
    pub async fn upsert_organization_member(
        &self,
        username: &str,
        organization_id: Uuid,
        member: &str,
        role: OrgRole,
    ) -> ResultEngine<OrganizationMember> {
        with_tx!(self, |db_tx| {
            let (organization, caller_role) = self
                .require_organization_manager(&db_tx, organization_id, username)
                .await?;
            if role == OrgRole::Owner && caller_role != OrgRole::Owner {
                return Err(EngineError::Forbidden(
                    "only an owner can grant ownership".to_string(),
                ));
            }
            if member == organization.owner_id {
                return Err(EngineError::InvalidState(
                    "the organization owner's role cannot change".to_string(),
                ));
            }
            self.require_user(&db_tx, member).await?;

            let existing = organization_members::Entity::find_by_id((
                organization_id.to_string(),
                member.to_string(),
            ))
            .one(&db_tx)
            .await?;
            if let Some(current) = existing.as_ref()
                && current.role == OrgRole::Owner.as_str()
                && caller_role != OrgRole::Owner
            {
                return Err(EngineError::Forbidden(
                    "only an owner can change an owner's role".to_string(),
                ));
            }
            let membership = OrganizationMember {
                organization_id,
                user_id: member.to_string(),
                role,
                created_at: existing.as_ref().map_or_else(Utc::now, |m| m.created_at),
            };
            let active = organization_members::ActiveModel::from(&membership);
            if existing.is_some() {
                active.update(&db_tx).await?;
            } else {
                active.insert(&db_tx).await?;
            }
            Ok(membership)
        })
    }

    /// Remove a member (owner/admin, or the member themself). The founding
    /// owner cannot be removed; other owners only by an owner.
    pub async fn remove_organization_member(
        &self,
        username: &str,
        organization_id: Uuid,
        member: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let organization = if member == username {
                self.require_organization_member(&db_tx, organization_id, username)
                    .await?
            } else {
                let (organization, caller_role) = self
                    .require_organization_manager(&db_tx, organization_id, username)
                    .await?;
                let target_role = self
                    .organization_role(&db_tx, organization_id, member)
                    .await?;
                if target_role == Some(OrgRole::Owner) && caller_role != OrgRole::Owner {
                    return Err(EngineError::Forbidden(
                        "only an owner can remove an owner".to_string(),
                    ));
                }
                organization
            };
            if member == organization.owner_id {
                return Err(EngineError::InvalidState(
                    "the organization owner cannot be removed".to_string(),
                ));
            }
            let result = organization_members::Entity::delete_by_id((
                organization_id.to_string(),
                member.to_string(),
            ))
            .exec(&db_tx)
            .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("member not exists".to_string()));
            }
            Ok(())
        })
    }
}
