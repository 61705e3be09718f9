//! Teams, optionally nested under an organization.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for Team {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "team")?,
            organization_id: parse_optional_uuid(model.organization_id.as_deref(), "organization")?,
            name: model.name,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

impl From<&Team> for ActiveModel {
    fn from(team: &Team) -> Self {
        Self {
            id: ActiveValue::Set(team.id.to_string()),
            organization_id: ActiveValue::Set(team.organization_id.map(|id| id.to_string())),
            name: ActiveValue::Set(team.name.clone()),
            description: ActiveValue::Set(team.description.clone()),
            created_by: ActiveValue::Set(team.created_by.clone()),
            created_at: ActiveValue::Set(team.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "teams")]
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
    #[sea_orm(has_many = "super::team_members::Entity")]
    Members,
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
