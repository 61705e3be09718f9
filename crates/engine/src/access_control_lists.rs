//! Named permission bundles.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessControlList {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for AccessControlList {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "acl")?,
            organization_id: parse_optional_uuid(model.organization_id.as_deref(), "organization")?,
            name: model.name,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

impl From<&AccessControlList> for ActiveModel {
    fn from(acl: &AccessControlList) -> Self {
        Self {
            id: ActiveValue::Set(acl.id.to_string()),
            organization_id: ActiveValue::Set(acl.organization_id.map(|id| id.to_string())),
            name: ActiveValue::Set(acl.name.clone()),
            description: ActiveValue::Set(acl.description.clone()),
            created_by: ActiveValue::Set(acl.created_by.clone()),
            created_at: ActiveValue::Set(acl.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "access_control_lists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::acl_rules::Entity")]
    Rules,
    #[sea_orm(has_many = "super::acl_assignments::Entity")]
    Assignments,
}

impl Related<super::acl_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rules.def()
    }
}

impl Related<super::acl_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
