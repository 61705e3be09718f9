//! One `(resource_type, permission)` pair inside an ACL.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Permission, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AclRule {
    pub id: Uuid,
    pub acl_id: Uuid,
    pub resource_type: String,
    pub permission: Permission,
}

impl TryFrom<Model> for AclRule {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "acl rule")?,
            acl_id: parse_uuid(&model.acl_id, "acl")?,
            permission: Permission::try_from(model.permission.as_str())?,
            resource_type: model.resource_type,
        })
    }
}

impl From<&AclRule> for ActiveModel {
    fn from(rule: &AclRule) -> Self {
        Self {
            id: ActiveValue::Set(rule.id.to_string()),
            acl_id: ActiveValue::Set(rule.acl_id.to_string()),
            resource_type: ActiveValue::Set(rule.resource_type.clone()),
            permission: ActiveValue::Set(rule.permission.as_str().to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "acl_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub acl_id: String,
    pub resource_type: String,
    pub permission: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::access_control_lists::Entity",
        from = "Column::AclId",
        to = "super::access_control_lists::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Acls,
}

impl Related<super::access_control_lists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Acls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
