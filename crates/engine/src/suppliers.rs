//! Supplier profile: a 1:1 extension of a user that bids.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Supplier {
    pub user_id: String,
    pub industry: String,
    pub description: Option<String>,
    /// 0 (lowest risk) to 100 (highest risk).
    pub risk_score: i32,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Supplier {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            industry: model.industry,
            description: model.description,
            risk_score: model.risk_score,
            verified: model.verified,
            created_at: model.created_at,
        }
    }
}

impl From<&Supplier> for ActiveModel {
    fn from(value: &Supplier) -> Self {
        Self {
            user_id: ActiveValue::Set(value.user_id.clone()),
            industry: ActiveValue::Set(value.industry.clone()),
            description: ActiveValue::Set(value.description.clone()),
            risk_score: ActiveValue::Set(value.risk_score),
            verified: ActiveValue::Set(value.verified),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub industry: String,
    pub description: Option<String>,
    pub risk_score: i32,
    pub verified: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
