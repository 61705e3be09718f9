use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, LedgerEntry, RecordKind, RecordVerification, ResultEngine, ledger,
};

use super::{Engine, with_tx};

impl Engine {
    /// Recompute a record's hash from its stored row and compare it with the
    /// stored hash.
    pub async fn verify_record(
        &self,
        username: &str,
        kind: RecordKind,
        id: Uuid,
    ) -> ResultEngine<RecordVerification> {
        with_tx!(self, |db_tx| {
            let (stored, computed) = match kind {
                RecordKind::Rfq => {
                    let rfq = self.require_rfq_visible(&db_tx, id, username).await?;
                    let computed = rfq.compute_hash();
                    (rfq.blockchain_hash, computed)
                }
                RecordKind::Contract => {
                    let contract = self.require_contract_party(&db_tx, id, username).await?;
                    let computed = contract.compute_hash();
                    (contract.blockchain_hash, computed)
                }
                RecordKind::Transaction => {
                    let model = ledger::Entity::find_by_id(id.to_string())
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| {
                            EngineError::KeyNotFound("transaction not exists".to_string())
                        })?;
                    let entry = LedgerEntry::try_from(model)?;
                    let involved = entry.user_id == username
                        || entry.counterparty_id.as_deref() == Some(username);
                    if !involved && !self.is_platform_admin(&db_tx, username).await? {
                        return Err(EngineError::Forbidden(
                            "not a party to this transaction".to_string(),
                        ));
                    }
                    let computed = entry.compute_hash();
                    (entry.blockchain_hash, computed)
                }
            };
            Ok(RecordVerification::new(kind, id.to_string(), stored, computed))
        })
    }
}
