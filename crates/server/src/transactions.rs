//! Wallet ledger endpoints.

use api_types::wallet::{TransactionNew, TransactionView, WalletView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{LedgerEntry, NewTransaction, User};

use crate::{ServerError, convert::transaction_kind, server::ServerState};

fn transaction_view(entry: LedgerEntry) -> TransactionView {
    TransactionView {
        id: entry.id,
        user_id: entry.user_id,
        kind: transaction_kind::to_wire(entry.kind),
        amount_minor: entry.amount_minor,
        balance_after_minor: entry.balance_after_minor,
        counterparty_id: entry.counterparty_id,
        contract_id: entry.contract_id,
        note: entry.note,
        blockchain_hash: entry.blockchain_hash,
        created_at: entry.created_at,
    }
}

/// The caller's entries, including payments received as counterparty.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let entries = state
        .engine
        .list_transactions(&user.username)
        .await?
        .into_iter()
        .map(transaction_view)
        .collect();
    Ok(Json(entries))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let entry = state
        .engine
        .record_transaction(
            &user.username,
            NewTransaction {
                kind: transaction_kind::to_engine(payload.kind),
                amount_minor: payload.amount_minor,
                counterparty_id: payload.counterparty_id,
                contract_id: payload.contract_id,
                note: payload.note,
            },
        )
        .await?;
    tracing::info!(
        "{} {} of {} recorded",
        user.username,
        entry.kind.as_str(),
        entry.amount_minor
    );
    Ok((StatusCode::CREATED, Json(transaction_view(entry))))
}

pub async fn wallet(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<WalletView>, ServerError> {
    let balance = state.engine.wallet_balance(&user.username).await?;
    Ok(Json(WalletView {
        username: user.username,
        balance_minor: balance.minor(),
        balance: balance.to_string(),
    }))
}
