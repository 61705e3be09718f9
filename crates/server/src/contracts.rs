use api_types::contract::{ContractNew, ContractStatusUpdate, ContractView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Contract, ContractDraft, User};
use uuid::Uuid;

use crate::{ServerError, convert::contract_status, server::ServerState};

fn contract_view(contract: Contract) -> ContractView {
    ContractView {
        id: contract.id,
        rfq_id: contract.rfq_id,
        bid_id: contract.bid_id,
        buyer_id: contract.buyer_id,
        supplier_id: contract.supplier_id,
        title: contract.title,
        terms: contract.terms,
        value_minor: contract.value_minor,
        status: contract_status::to_wire(contract.status),
        start_date: contract.start_date,
        end_date: contract.end_date,
        blockchain_hash: contract.blockchain_hash,
        created_at: contract.created_at,
        updated_at: contract.updated_at,
    }
}

/// Contracts the caller is a party to.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ContractView>>, ServerError> {
    let contracts = state
        .engine
        .list_contracts(&user.username)
        .await?
        .into_iter()
        .map(contract_view)
        .collect();
    Ok(Json(contracts))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ContractNew>,
) -> Result<(StatusCode, Json<ContractView>), ServerError> {
    let contract = state
        .engine
        .create_contract(
            &user.username,
            ContractDraft {
                bid_id: payload.bid_id,
                title: payload.title,
                terms: payload.terms,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;
    tracing::info!(
        "contract {} drafted between {} and {}",
        contract.id,
        contract.buyer_id,
        contract.supplier_id
    );
    Ok((StatusCode::CREATED, Json(contract_view(contract))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractView>, ServerError> {
    let contract = state.engine.contract(&user.username, id).await?;
    Ok(Json(contract_view(contract)))
}

pub async fn update_status(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContractStatusUpdate>,
) -> Result<Json<ContractView>, ServerError> {
    let contract = state
        .engine
        .update_contract_status(
            &user.username,
            id,
            contract_status::to_engine(payload.status),
        )
        .await?;
    tracing::info!(
        "contract {} moved to {}",
        contract.id,
        contract.status.as_str()
    );
    Ok(Json(contract_view(contract)))
}
