use chrono::Utc;
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, LedgerEntry, Money, ResultEngine, TransactionKind, ledger, users,
    util::{normalize_optional_text, require_positive},
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount_minor: i64,
    /// Payee of a `payment`; defaults to the contract supplier when a
    /// contract is given.
    pub counterparty_id: Option<String>,
    pub contract_id: Option<Uuid>,
    pub note: Option<String>,
}

impl Engine {
    /// Credit only while the new balance fits in an `i64`.
    pub(super) async fn credit_wallet(
        &self,
        db: &DatabaseTransaction,
        username: &str,
        amount_minor: i64,
    ) -> ResultEngine<i64> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::WalletBalanceMinor,
                Expr::col(users::Column::WalletBalanceMinor).add(amount_minor),
            )
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::WalletBalanceMinor.lte(i64::MAX - amount_minor))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            let user = self.require_user(db, username).await?;
            return Err(EngineError::InvalidInput(format!(
                "crediting {} would overflow the balance of {}",
                Money::new(amount_minor),
                user.username
            )));
        }
        Ok(self.require_user(db, username).await?.wallet_balance_minor)
    }

    /// Debit only when the balance covers `amount_minor`; the check and the
    /// write are one statement.
    pub(super) async fn debit_wallet(
        &self,
        db: &DatabaseTransaction,
        username: &str,
        amount_minor: i64,
    ) -> ResultEngine<i64> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::WalletBalanceMinor,
                Expr::col(users::Column::WalletBalanceMinor).sub(amount_minor),
            )
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::WalletBalanceMinor.gte(amount_minor))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            let user = self.require_user(db, username).await?;
            return Err(EngineError::InsufficientFunds(format!(
                "balance {} is below {}",
                Money::new(user.wallet_balance_minor),
                Money::new(amount_minor)
            )));
        }
        Ok(self.require_user(db, username).await?.wallet_balance_minor)
    }

    /// Apply one ledger entry to the caller's wallet.
    ///
    /// Deposits and refunds credit; every other kind debits. A payment with a
    /// counterparty credits the counterparty in the same transaction.
    pub async fn record_transaction(
        &self,
        username: &str,
        new_tx: NewTransaction,
    ) -> ResultEngine<LedgerEntry> {
        let amount_minor = require_positive(new_tx.amount_minor, "amount")?;
        let note = normalize_optional_text(new_tx.note.as_deref());

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, username).await?;

            let mut counterparty_id = new_tx.counterparty_id.clone();
            if let Some(contract_id) = new_tx.contract_id {
                let contract = self
                    .require_contract_party(&db_tx, contract_id, username)
                    .await?;
                if new_tx.kind == TransactionKind::Payment {
                    if contract.buyer_id != username {
                        return Err(EngineError::Forbidden(
                            "only the buyer pays against a contract".to_string(),
                        ));
                    }
                    counterparty_id.get_or_insert(contract.supplier_id);
                }
            }

            if let Some(counterparty) = counterparty_id.as_deref() {
                if new_tx.kind != TransactionKind::Payment {
                    return Err(EngineError::InvalidInput(
                        "only payments have a counterparty".to_string(),
                    ));
                }
                if counterparty == username {
                    return Err(EngineError::InvalidInput(
                        "cannot pay yourself".to_string(),
                    ));
                }
                self.require_user(&db_tx, counterparty).await?;
            }

            let balance_after_minor = if new_tx.kind.is_credit() {
                self.credit_wallet(&db_tx, username, amount_minor).await?
            } else {
                self.debit_wallet(&db_tx, username, amount_minor).await?
            };
            if let Some(counterparty) = counterparty_id.as_deref() {
                self.credit_wallet(&db_tx, counterparty, amount_minor).await?;
            }

            let mut entry = LedgerEntry {
                id: Uuid::new_v4(),
                user_id: username.to_string(),
                kind: new_tx.kind,
                amount_minor,
                balance_after_minor,
                counterparty_id,
                contract_id: new_tx.contract_id,
                note,
                blockchain_hash: None,
                created_at: Utc::now(),
            };
            entry.blockchain_hash = Some(entry.compute_hash());
            ledger::ActiveModel::from(&entry).insert(&db_tx).await?;
            Ok(entry)
        })
    }

    /// Entries the caller made or received as counterparty, newest first.
    pub async fn list_transactions(&self, username: &str) -> ResultEngine<Vec<LedgerEntry>> {
        with_tx!(self, |db_tx| {
            let rows = ledger::Entity::find()
                .filter(
                    Condition::any()
                        .add(ledger::Column::UserId.eq(username))
                        .add(ledger::Column::CounterpartyId.eq(username)),
                )
                .order_by_desc(ledger::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(LedgerEntry::try_from).collect()
        })
    }

    pub async fn wallet_balance(&self, username: &str) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, username).await?;
            Ok(Money::new(user.wallet_balance_minor))
        })
    }
}
