//! Requests for quotation.
//!
//! An `Rfq` is a buyer's procurement ask. Its `status` moves through a small
//! transition table, see [`RfqStatus::can_transition_to`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    record::{RecordKind, record_hash},
    util::parse_uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfqStatus {
    Draft,
    Open,
    InReview,
    Awarded,
    Closed,
    Cancelled,
}

impl RfqStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::InReview => "in_review",
            Self::Awarded => "awarded",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Whether bids may still be accepted against the RFQ.
    pub fn is_accepting(self) -> bool {
        matches!(self, Self::Open | Self::InReview)
    }

    pub fn can_transition_to(self, next: RfqStatus) -> bool {
        use RfqStatus::*;
        matches!(
            (self, next),
            (Draft, Open | Cancelled)
                | (Open, InReview | Awarded | Closed | Cancelled)
                | (InReview, Open | Awarded | Closed | Cancelled)
                | (Awarded, Closed)
        )
    }
}

impl TryFrom<&str> for RfqStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "in_review" => Ok(Self::InReview),
            "awarded" => Ok(Self::Awarded),
            "closed" => Ok(Self::Closed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!("invalid rfq status: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rfq {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub quantity: i64,
    pub budget_minor: Option<i64>,
    pub deadline: DateTime<Utc>,
    pub status: RfqStatus,
    pub blockchain_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rfq {
    /// Hash over the fields a buyer commits to.
    pub fn compute_hash(&self) -> String {
        record_hash(
            RecordKind::Rfq,
            &[
                self.id.to_string(),
                self.user_id.clone(),
                self.title.clone(),
                self.description.clone(),
                self.category.clone(),
                self.quantity.to_string(),
                self.budget_minor.map(|b| b.to_string()).unwrap_or_default(),
                self.deadline.timestamp().to_string(),
                self.status.as_str().to_string(),
            ],
        )
    }
}

impl TryFrom<Model> for Rfq {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "rfq")?,
            status: RfqStatus::try_from(model.status.as_str())?,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            category: model.category,
            quantity: model.quantity,
            budget_minor: model.budget_minor,
            deadline: model.deadline,
            blockchain_hash: model.blockchain_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Rfq> for ActiveModel {
    fn from(rfq: &Rfq) -> Self {
        Self {
            id: ActiveValue::Set(rfq.id.to_string()),
            user_id: ActiveValue::Set(rfq.user_id.clone()),
            title: ActiveValue::Set(rfq.title.clone()),
            description: ActiveValue::Set(rfq.description.clone()),
            category: ActiveValue::Set(rfq.category.clone()),
            quantity: ActiveValue::Set(rfq.quantity),
            budget_minor: ActiveValue::Set(rfq.budget_minor),
            deadline: ActiveValue::Set(rfq.deadline),
            status: ActiveValue::Set(rfq.status.as_str().to_string()),
            blockchain_hash: ActiveValue::Set(rfq.blockchain_hash.clone()),
            created_at: ActiveValue::Set(rfq.created_at),
            updated_at: ActiveValue::Set(rfq.updated_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "rfqs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub quantity: i64,
    pub budget_minor: Option<i64>,
    pub deadline: DateTimeUtc,
    pub status: String,
    pub blockchain_hash: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rfq_can_be_awarded_but_not_reopened_after_close() {
        assert!(RfqStatus::Open.can_transition_to(RfqStatus::Awarded));
        assert!(RfqStatus::InReview.can_transition_to(RfqStatus::Open));
        assert!(RfqStatus::Awarded.can_transition_to(RfqStatus::Closed));
        assert!(!RfqStatus::Closed.can_transition_to(RfqStatus::Open));
        assert!(!RfqStatus::Cancelled.can_transition_to(RfqStatus::Open));
        assert!(!RfqStatus::Awarded.can_transition_to(RfqStatus::Open));
        assert!(!RfqStatus::Draft.can_transition_to(RfqStatus::Awarded));
    }

    #[test]
    fn terminal_states_have_no_exit() {
        let all = [
            RfqStatus::Draft,
            RfqStatus::Open,
            RfqStatus::InReview,
            RfqStatus::Awarded,
            RfqStatus::Closed,
            RfqStatus::Cancelled,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            assert!(all.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn hash_changes_with_committed_fields() {
        let now = Utc::now();
        let mut rfq = Rfq {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            title: "Steel pipes".to_string(),
            description: "50mm galvanized".to_string(),
            category: "metals".to_string(),
            quantity: 500,
            budget_minor: Some(1_000_000),
            deadline: now,
            status: RfqStatus::Open,
            blockchain_hash: None,
            created_at: now,
            updated_at: now,
        };
        let before = rfq.compute_hash();
        rfq.quantity = 600;
        assert_ne!(before, rfq.compute_hash());
    }
}
