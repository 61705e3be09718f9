//! RFQ endpoints.

use api_types::rfq::{RfqListQuery, RfqNew, RfqPatch, RfqView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewRfq, Rfq, RfqListFilter, RfqUpdate, User};
use uuid::Uuid;

use crate::{ServerError, convert::rfq_status, server::ServerState};

pub(crate) fn rfq_view(rfq: Rfq) -> RfqView {
    RfqView {
        id: rfq.id,
        user_id: rfq.user_id,
        title: rfq.title,
        description: rfq.description,
        category: rfq.category,
        quantity: rfq.quantity,
        budget_minor: rfq.budget_minor,
        deadline: rfq.deadline,
        status: rfq_status::to_wire(rfq.status),
        blockchain_hash: rfq.blockchain_hash,
        created_at: rfq.created_at,
        updated_at: rfq.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<RfqListQuery>,
) -> Result<Json<Vec<RfqView>>, ServerError> {
    let filter = RfqListFilter {
        status: query.status.map(rfq_status::to_engine),
        category: query.category,
        owner: query
            .mine
            .unwrap_or(false)
            .then(|| user.username.clone()),
    };
    let rfqs = state
        .engine
        .list_rfqs(&user.username, filter)
        .await?
        .into_iter()
        .map(rfq_view)
        .collect();
    Ok(Json(rfqs))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<RfqNew>,
) -> Result<(StatusCode, Json<RfqView>), ServerError> {
    let rfq = state
        .engine
        .create_rfq(
            &user.username,
            NewRfq {
                title: payload.title,
                description: payload.description,
                category: payload.category,
                quantity: payload.quantity,
                budget_minor: payload.budget_minor,
                deadline: payload.deadline,
                draft: payload.draft,
            },
        )
        .await?;
    tracing::info!("rfq {} created by {}", rfq.id, user.username);
    Ok((StatusCode::CREATED, Json(rfq_view(rfq))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RfqView>, ServerError> {
    let rfq = state.engine.rfq(&user.username, id).await?;
    Ok(Json(rfq_view(rfq)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RfqPatch>,
) -> Result<Json<RfqView>, ServerError> {
    let rfq = state
        .engine
        .update_rfq(
            &user.username,
            id,
            RfqUpdate {
                title: payload.title,
                description: payload.description,
                category: payload.category,
                quantity: payload.quantity,
                budget_minor: payload.budget_minor,
                deadline: payload.deadline,
                status: payload.status.map(rfq_status::to_engine),
            },
        )
        .await?;
    Ok(Json(rfq_view(rfq)))
}
