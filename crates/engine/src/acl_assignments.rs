//! Binding of an ACL to a user, team or organization.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, SubjectKind, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AclAssignment {
    pub id: Uuid,
    pub acl_id: Uuid,
    pub subject_kind: SubjectKind,
    pub subject_id: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for AclAssignment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "acl assignment")?,
            acl_id: parse_uuid(&model.acl_id, "acl")?,
            subject_kind: SubjectKind::try_from(model.subject_kind.as_str())?,
            subject_id: model.subject_id,
            created_at: model.created_at,
        })
    }
}

impl From<&AclAssignment> for ActiveModel {
    fn from(assignment: &AclAssignment) -> Self {
        Self {
            id: ActiveValue::Set(assignment.id.to_string()),
            acl_id: ActiveValue::Set(assignment.acl_id.to_string()),
            subject_kind: ActiveValue::Set(assignment.subject_kind.as_str().to_string()),
            subject_id: ActiveValue::Set(assignment.subject_id.clone()),
            created_at: ActiveValue::Set(assignment.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "acl_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub acl_id: String,
    pub subject_kind: String,
    pub subject_id: String,
    pub created_at: DateTimeUtc,
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
