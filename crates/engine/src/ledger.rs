//! Wallet ledger entries.
//!
//! Every change to `users.wallet_balance_minor` is recorded as one
//! `LedgerEntry` carrying the balance observed right after the change.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    record::{RecordKind, record_hash},
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Payment,
    Refund,
    Escrow,
    Fee,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Payment => "payment",
            Self::Refund => "refund",
            Self::Escrow => "escrow",
            Self::Fee => "fee",
        }
    }

    /// Credits increase the owner's balance; everything else debits it.
    pub fn is_credit(self) -> bool {
        matches!(self, Self::Deposit | Self::Refund)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "payment" => Ok(Self::Payment),
            "refund" => Ok(Self::Refund),
            "escrow" => Ok(Self::Escrow),
            "fee" => Ok(Self::Fee),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    /// Always > 0; the kind defines the direction.
    pub amount_minor: i64,
    pub balance_after_minor: i64,
    pub counterparty_id: Option<String>,
    pub contract_id: Option<Uuid>,
    pub note: Option<String>,
    pub blockchain_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn compute_hash(&self) -> String {
        record_hash(
            RecordKind::Transaction,
            &[
                self.id.to_string(),
                self.user_id.clone(),
                self.kind.as_str().to_string(),
                self.amount_minor.to_string(),
                self.balance_after_minor.to_string(),
                self.counterparty_id.clone().unwrap_or_default(),
                self.contract_id.map(|id| id.to_string()).unwrap_or_default(),
            ],
        )
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            contract_id: parse_optional_uuid(model.contract_id.as_deref(), "contract")?,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
            balance_after_minor: model.balance_after_minor,
            counterparty_id: model.counterparty_id,
            note: model.note,
            blockchain_hash: model.blockchain_hash,
            created_at: model.created_at,
        })
    }
}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            user_id: ActiveValue::Set(entry.user_id.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            balance_after_minor: ActiveValue::Set(entry.balance_after_minor),
            counterparty_id: ActiveValue::Set(entry.counterparty_id.clone()),
            contract_id: ActiveValue::Set(entry.contract_id.map(|id| id.to_string())),
            note: ActiveValue::Set(entry.note.clone()),
            blockchain_hash: ActiveValue::Set(entry.blockchain_hash.clone()),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub balance_after_minor: i64,
    pub counterparty_id: Option<String>,
    pub contract_id: Option<String>,
    pub note: Option<String>,
    pub blockchain_hash: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_deposits_and_refunds_credit() {
        assert!(TransactionKind::Deposit.is_credit());
        assert!(TransactionKind::Refund.is_credit());
        for kind in [
            TransactionKind::Withdrawal,
            TransactionKind::Payment,
            TransactionKind::Escrow,
            TransactionKind::Fee,
        ] {
            assert!(!kind.is_credit(), "{} should debit", kind.as_str());
        }
    }
}
