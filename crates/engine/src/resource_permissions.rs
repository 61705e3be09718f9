//! Direct permission grants outside any ACL.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Permission, SubjectKind, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePermission {
    pub id: Uuid,
    pub resource_type: String,
    /// `None` grants the permission on every resource of the type.
    pub resource_id: Option<String>,
    pub subject_kind: SubjectKind,
    pub subject_id: String,
    pub permission: Permission,
    pub granted_by: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for ResourcePermission {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "resource permission")?,
            subject_kind: SubjectKind::try_from(model.subject_kind.as_str())?,
            permission: Permission::try_from(model.permission.as_str())?,
            resource_type: model.resource_type,
            resource_id: model.resource_id,
            subject_id: model.subject_id,
            granted_by: model.granted_by,
            created_at: model.created_at,
        })
    }
}

impl From<&ResourcePermission> for ActiveModel {
    fn from(grant: &ResourcePermission) -> Self {
        Self {
            id: ActiveValue::Set(grant.id.to_string()),
            resource_type: ActiveValue::Set(grant.resource_type.clone()),
            resource_id: ActiveValue::Set(grant.resource_id.clone()),
            subject_kind: ActiveValue::Set(grant.subject_kind.as_str().to_string()),
            subject_id: ActiveValue::Set(grant.subject_id.clone()),
            permission: ActiveValue::Set(grant.permission.as_str().to_string()),
            granted_by: ActiveValue::Set(grant.granted_by.clone()),
            created_at: ActiveValue::Set(grant.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "resource_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub subject_kind: String,
    pub subject_id: String,
    pub permission: String,
    pub granted_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
