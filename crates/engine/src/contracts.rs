//! Contracts formed from accepted bids.

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
pub enum ContractStatus {
    Draft,
    PendingApproval,
    Active,
    Completed,
    Terminated,
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
        }
    }

    pub fn can_transition_to(self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (Draft, PendingApproval | Terminated)
                | (PendingApproval, Active | Draft | Terminated)
                | (Active, Completed | Terminated)
        )
    }
}

impl TryFrom<&str> for ContractStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "pending_approval" => Ok(Self::PendingApproval),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "terminated" => Ok(Self::Terminated),
            other => Err(EngineError::InvalidInput(format!(
                "invalid contract status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contract {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub bid_id: Uuid,
    pub buyer_id: String,
    pub supplier_id: String,
    pub title: String,
    pub terms: String,
    pub value_minor: i64,
    pub status: ContractStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub blockchain_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn is_party(&self, user_id: &str) -> bool {
        self.buyer_id == user_id || self.supplier_id == user_id
    }

    pub fn compute_hash(&self) -> String {
        record_hash(
            RecordKind::Contract,
            &[
                self.id.to_string(),
                self.rfq_id.to_string(),
                self.bid_id.to_string(),
                self.buyer_id.clone(),
                self.supplier_id.clone(),
                self.title.clone(),
                self.terms.clone(),
                self.value_minor.to_string(),
                self.status.as_str().to_string(),
            ],
        )
    }
}

impl TryFrom<Model> for Contract {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "contract")?,
            rfq_id: parse_uuid(&model.rfq_id, "rfq")?,
            bid_id: parse_uuid(&model.bid_id, "bid")?,
            status: ContractStatus::try_from(model.status.as_str())?,
            buyer_id: model.buyer_id,
            supplier_id: model.supplier_id,
            title: model.title,
            terms: model.terms,
            value_minor: model.value_minor,
            start_date: model.start_date,
            end_date: model.end_date,
            blockchain_hash: model.blockchain_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Contract> for ActiveModel {
    fn from(contract: &Contract) -> Self {
        Self {
            id: ActiveValue::Set(contract.id.to_string()),
            rfq_id: ActiveValue::Set(contract.rfq_id.to_string()),
            bid_id: ActiveValue::Set(contract.bid_id.to_string()),
            buyer_id: ActiveValue::Set(contract.buyer_id.clone()),
            supplier_id: ActiveValue::Set(contract.supplier_id.clone()),
            title: ActiveValue::Set(contract.title.clone()),
            terms: ActiveValue::Set(contract.terms.clone()),
            value_minor: ActiveValue::Set(contract.value_minor),
            status: ActiveValue::Set(contract.status.as_str().to_string()),
            start_date: ActiveValue::Set(contract.start_date),
            end_date: ActiveValue::Set(contract.end_date),
            blockchain_hash: ActiveValue::Set(contract.blockchain_hash.clone()),
            created_at: ActiveValue::Set(contract.created_at),
            updated_at: ActiveValue::Set(contract.updated_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub rfq_id: String,
    pub bid_id: String,
    pub buyer_id: String,
    pub supplier_id: String,
    pub title: String,
    pub terms: String,
    pub value_minor: i64,
    pub status: String,
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,
    pub blockchain_hash: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_path() {
        use ContractStatus::*;
        assert!(Draft.can_transition_to(PendingApproval));
        assert!(PendingApproval.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(!Draft.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Terminated.can_transition_to(Draft));
    }
}
