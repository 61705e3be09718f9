use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BidStatus, Contract, ContractStatus, EngineError, ResultEngine, RfqStatus, contracts,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// Buyer's input when turning an accepted bid into a contract.
#[derive(Clone, Debug)]
pub struct ContractDraft {
    pub bid_id: Uuid,
    /// Defaults to the RFQ title.
    pub title: Option<String>,
    pub terms: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Engine {
    /// Create a `draft` contract from an accepted bid. Only the RFQ owner
    /// may do this, once per bid.
    pub async fn create_contract(
        &self,
        username: &str,
        draft: ContractDraft,
    ) -> ResultEngine<Contract> {
        let terms = normalize_required_text(&draft.terms, "terms")?;
        if let (Some(start), Some(end)) = (draft.start_date, draft.end_date)
            && end < start
        {
            return Err(EngineError::InvalidInput(
                "end_date must not precede start_date".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let bid = self.require_bid(&db_tx, draft.bid_id).await?;
            let rfq = self.require_rfq_owner(&db_tx, bid.rfq_id, username).await?;
            if bid.status != BidStatus::Accepted {
                return Err(EngineError::InvalidState(format!(
                    "bid is {}, not accepted",
                    bid.status.as_str()
                )));
            }
            let existing = contracts::Entity::find()
                .filter(contracts::Column::BidId.eq(bid.id.to_string()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(format!("contract for bid {}", bid.id)));
            }

            let title = match normalize_optional_text(draft.title.as_deref()) {
                Some(title) => title,
                None => rfq.title.clone(),
            };
            let now = Utc::now();
            let mut contract = Contract {
                id: Uuid::new_v4(),
                rfq_id: rfq.id,
                bid_id: bid.id,
                buyer_id: rfq.user_id,
                supplier_id: bid.supplier_id,
                title,
                terms,
                value_minor: bid.price_minor,
                status: ContractStatus::Draft,
                start_date: draft.start_date,
                end_date: draft.end_date,
                blockchain_hash: None,
                created_at: now,
                updated_at: now,
            };
            contract.blockchain_hash = Some(contract.compute_hash());
            contracts::ActiveModel::from(&contract).insert(&db_tx).await?;
            Ok(contract)
        })
    }

    pub async fn contract(&self, username: &str, id: Uuid) -> ResultEngine<Contract> {
        with_tx!(self, |db_tx| self.require_contract_party(&db_tx, id, username).await)
    }

    /// Contracts where the caller is buyer or supplier, newest first.
    pub async fn list_contracts(&self, username: &str) -> ResultEngine<Vec<Contract>> {
        with_tx!(self, |db_tx| {
            let rows = contracts::Entity::find()
                .filter(
                    Condition::any()
                        .add(contracts::Column::BuyerId.eq(username))
                        .add(contracts::Column::SupplierId.eq(username)),
                )
                .order_by_desc(contracts::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Contract::try_from).collect()
        })
    }

    /// Move a contract along its lifecycle.
    ///
    /// Only the supplier approves (`pending_approval -> active`). Activation
    /// stamps `start_date` when unset; completion closes the awarded RFQ.
    pub async fn update_contract_status(
        &self,
        username: &str,
        id: Uuid,
        next: ContractStatus,
    ) -> ResultEngine<Contract> {
        with_tx!(self, |db_tx| {
            let mut contract = self.require_contract_party(&db_tx, id, username).await?;
            if !contract.status.can_transition_to(next) {
                return Err(EngineError::InvalidState(format!(
                    "cannot move contract from {} to {}",
                    contract.status.as_str(),
                    next.as_str()
                )));
            }
            if contract.status == ContractStatus::PendingApproval
                && next == ContractStatus::Active
                && contract.supplier_id != username
            {
                return Err(EngineError::Forbidden(
                    "only the supplier can approve a contract".to_string(),
                ));
            }

            let now = Utc::now();
            contract.status = next;
            contract.updated_at = now;
            match next {
                ContractStatus::Active if contract.start_date.is_none() => {
                    contract.start_date = Some(now);
                }
                ContractStatus::Completed if contract.end_date.is_none() => {
                    contract.end_date = Some(now);
                }
                _ => {}
            }
            contract.blockchain_hash = Some(contract.compute_hash());
            contracts::ActiveModel::from(&contract).update(&db_tx).await?;

            if next == ContractStatus::Completed {
                let mut rfq = self.require_rfq(&db_tx, contract.rfq_id).await?;
                if rfq.status == RfqStatus::Awarded {
                    rfq.status = RfqStatus::Closed;
                    self.save_rfq(&db_tx, &mut rfq).await?;
                }
            }
            Ok(contract)
        })
    }
}
