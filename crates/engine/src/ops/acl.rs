use chrono::Utc;
use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AccessControlList, AclAssignment, AclRule, EngineError, Permission, ResourcePermission,
    ResultEngine, SubjectKind, access_control_lists, acl_assignments, acl_rules,
    organization_members, permissions::normalize_resource_type, resource_permissions,
    util::{normalize_optional_text, normalize_required_text, parse_uuid},
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct NewAcl {
    pub name: String,
    pub description: Option<String>,
    pub organization_id: Option<Uuid>,
}

/// A direct grant; `resource_id: None` covers the whole resource type.
#[derive(Clone, Debug)]
pub struct NewGrant {
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub subject_kind: SubjectKind,
    pub subject_id: String,
    pub permission: Permission,
}

impl Engine {
    /// Creator, platform admin, or owner/admin of the ACL's organization.
    async fn require_acl_manager(
        &self,
        db: &DatabaseTransaction,
        acl_id: Uuid,
        username: &str,
    ) -> ResultEngine<AccessControlList> {
        let model = access_control_lists::Entity::find_by_id(acl_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("acl not exists".to_string()))?;
        let acl = AccessControlList::try_from(model)?;
        if acl.created_by == username || self.is_platform_admin(db, username).await? {
            return Ok(acl);
        }
        if let Some(organization_id) = acl.organization_id {
            self.require_organization_manager(db, organization_id, username)
                .await?;
            return Ok(acl);
        }
        Err(EngineError::Forbidden("cannot manage this acl".to_string()))
    }

    /// Check the subject exists and return its canonical id.
    async fn require_subject(
        &self,
        db: &DatabaseTransaction,
        kind: SubjectKind,
        id: &str,
    ) -> ResultEngine<String> {
        match kind {
            SubjectKind::User => Ok(self.require_user(db, id).await?.username),
            SubjectKind::Team => {
                let team_id = parse_uuid(id, "team")?;
                Ok(self.require_team(db, team_id).await?.id.to_string())
            }
            SubjectKind::Organization => {
                let organization_id = parse_uuid(id, "organization")?;
                Ok(self
                    .require_organization(db, organization_id)
                    .await?
                    .id
                    .to_string())
            }
        }
    }

    /// Platform admins create global ACLs; organization owners/admins create
    /// ACLs scoped to their organization.
    pub async fn create_acl(&self, username: &str, new_acl: NewAcl) -> ResultEngine<AccessControlList> {
        let name = normalize_required_text(&new_acl.name, "acl name")?;
        with_tx!(self, |db_tx| {
            match new_acl.organization_id {
                Some(organization_id) => {
                    self.require_organization_manager(&db_tx, organization_id, username)
                        .await?;
                }
                None => self.require_platform_admin(&db_tx, username).await?,
            }
            let acl = AccessControlList {
                id: Uuid::new_v4(),
                organization_id: new_acl.organization_id,
                name,
                description: normalize_optional_text(new_acl.description.as_deref()),
                created_by: username.to_string(),
                created_at: Utc::now(),
            };
            access_control_lists::ActiveModel::from(&acl)
                .insert(&db_tx)
                .await?;
            Ok(acl)
        })
    }

    /// ACLs the caller created or that belong to one of their organizations;
    /// all of them for platform admins.
    pub async fn list_acls(&self, username: &str) -> ResultEngine<Vec<AccessControlList>> {
        with_tx!(self, |db_tx| {
            let mut query = access_control_lists::Entity::find();
            if !self.is_platform_admin(&db_tx, username).await? {
                let organization_ids: Vec<String> = organization_members::Entity::find()
                    .filter(organization_members::Column::UserId.eq(username))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|m| m.organization_id)
                    .collect();
                query = query.filter(
                    Condition::any()
                        .add(access_control_lists::Column::CreatedBy.eq(username))
                        .add(access_control_lists::Column::OrganizationId.is_in(organization_ids)),
                );
            }
            let rows = query
                .order_by_asc(access_control_lists::Column::Name)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(AccessControlList::try_from).collect()
        })
    }

    pub async fn add_acl_rule(
        &self,
        username: &str,
        acl_id: Uuid,
        resource_type: &str,
        permission: Permission,
    ) -> ResultEngine<AclRule> {
        let resource_type = normalize_resource_type(resource_type)?;
        with_tx!(self, |db_tx| {
            self.require_acl_manager(&db_tx, acl_id, username).await?;
            let duplicate = acl_rules::Entity::find()
                .filter(acl_rules::Column::AclId.eq(acl_id.to_string()))
                .filter(acl_rules::Column::ResourceType.eq(resource_type.as_str()))
                .filter(acl_rules::Column::Permission.eq(permission.as_str()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "{resource_type}:{}",
                    permission.as_str()
                )));
            }
            let rule = AclRule {
                id: Uuid::new_v4(),
                acl_id,
                resource_type,
                permission,
            };
            acl_rules::ActiveModel::from(&rule).insert(&db_tx).await?;
            Ok(rule)
        })
    }

    pub async fn assign_acl(
        &self,
        username: &str,
        acl_id: Uuid,
        subject_kind: SubjectKind,
        subject_id: &str,
    ) -> ResultEngine<AclAssignment> {
        with_tx!(self, |db_tx| {
            self.require_acl_manager(&db_tx, acl_id, username).await?;
            let subject_id = self.require_subject(&db_tx, subject_kind, subject_id).await?;
            let duplicate = acl_assignments::Entity::find()
                .filter(acl_assignments::Column::AclId.eq(acl_id.to_string()))
                .filter(acl_assignments::Column::SubjectKind.eq(subject_kind.as_str()))
                .filter(acl_assignments::Column::SubjectId.eq(subject_id.as_str()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "{}:{subject_id}",
                    subject_kind.as_str()
                )));
            }
            let assignment = AclAssignment {
                id: Uuid::new_v4(),
                acl_id,
                subject_kind,
                subject_id,
                created_at: Utc::now(),
            };
            acl_assignments::ActiveModel::from(&assignment)
                .insert(&db_tx)
                .await?;
            Ok(assignment)
        })
    }

    /// Direct grant, by a platform admin or a holder of `manage` on the
    /// resource type.
    pub async fn grant_permission(
        &self,
        username: &str,
        grant: NewGrant,
    ) -> ResultEngine<ResourcePermission> {
        let resource_type = normalize_resource_type(&grant.resource_type)?;
        let resource_id = normalize_optional_text(grant.resource_id.as_deref());
        with_tx!(self, |db_tx| {
            if !self
                .has_permission(
                    &db_tx,
                    username,
                    &resource_type,
                    Permission::Manage,
                    resource_id.as_deref(),
                )
                .await?
            {
                return Err(EngineError::Forbidden(format!(
                    "manage permission on {resource_type} required"
                )));
            }
            let subject_id = self
                .require_subject(&db_tx, grant.subject_kind, &grant.subject_id)
                .await?;
            let permission = ResourcePermission {
                id: Uuid::new_v4(),
                resource_type,
                resource_id,
                subject_kind: grant.subject_kind,
                subject_id,
                permission: grant.permission,
                granted_by: username.to_string(),
                created_at: Utc::now(),
            };
            resource_permissions::ActiveModel::from(&permission)
                .insert(&db_tx)
                .await?;
            Ok(permission)
        })
    }

    /// Whether `username` may perform `permission` on `resource_type`
    /// (optionally one resource of it).
    pub async fn check_permission(
        &self,
        username: &str,
        resource_type: &str,
        permission: Permission,
        resource_id: Option<&str>,
    ) -> ResultEngine<bool> {
        let resource_type = normalize_resource_type(resource_type)?;
        with_tx!(self, |db_tx| {
            self.has_permission(&db_tx, username, &resource_type, permission, resource_id)
                .await
        })
    }
}
