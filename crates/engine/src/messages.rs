//! Direct messages between users, optionally scoped to an RFQ or bid.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

impl TryFrom<&str> for MessageStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            other => Err(EngineError::InvalidInput(format!(
                "invalid message status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    pub rfq_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for Message {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "message")?,
            rfq_id: parse_optional_uuid(model.rfq_id.as_deref(), "rfq")?,
            bid_id: parse_optional_uuid(model.bid_id.as_deref(), "bid")?,
            status: MessageStatus::try_from(model.status.as_str())?,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            content: model.content,
            created_at: model.created_at,
        })
    }
}

impl From<&Message> for ActiveModel {
    fn from(message: &Message) -> Self {
        Self {
            id: ActiveValue::Set(message.id.to_string()),
            sender_id: ActiveValue::Set(message.sender_id.clone()),
            receiver_id: ActiveValue::Set(message.receiver_id.clone()),
            rfq_id: ActiveValue::Set(message.rfq_id.map(|id| id.to_string())),
            bid_id: ActiveValue::Set(message.bid_id.map(|id| id.to_string())),
            content: ActiveValue::Set(message.content.clone()),
            status: ActiveValue::Set(message.status.as_str().to_string()),
            created_at: ActiveValue::Set(message.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub rfq_id: Option<String>,
    pub bid_id: Option<String>,
    pub content: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
