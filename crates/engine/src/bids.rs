//! Supplier bids on RFQs.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl TryFrom<&str> for BidStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "withdrawn" => Ok(Self::Withdrawn),
            other => Err(EngineError::InvalidInput(format!("invalid bid status: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bid {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub supplier_id: String,
    pub price_minor: i64,
    pub delivery_days: i32,
    pub note: Option<String>,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Model> for Bid {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "bid")?,
            rfq_id: parse_uuid(&model.rfq_id, "rfq")?,
            status: BidStatus::try_from(model.status.as_str())?,
            supplier_id: model.supplier_id,
            price_minor: model.price_minor,
            delivery_days: model.delivery_days,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Bid> for ActiveModel {
    fn from(bid: &Bid) -> Self {
        Self {
            id: ActiveValue::Set(bid.id.to_string()),
            rfq_id: ActiveValue::Set(bid.rfq_id.to_string()),
            supplier_id: ActiveValue::Set(bid.supplier_id.clone()),
            price_minor: ActiveValue::Set(bid.price_minor),
            delivery_days: ActiveValue::Set(bid.delivery_days),
            note: ActiveValue::Set(bid.note.clone()),
            status: ActiveValue::Set(bid.status.as_str().to_string()),
            created_at: ActiveValue::Set(bid.created_at),
            updated_at: ActiveValue::Set(bid.updated_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub rfq_id: String,
    pub supplier_id: String,
    pub price_minor: i64,
    pub delivery_days: i32,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rfqs::Entity",
        from = "Column::RfqId",
        to = "super::rfqs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Rfqs,
}

impl Related<super::rfqs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rfqs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
