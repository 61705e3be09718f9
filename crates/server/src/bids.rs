use api_types::bid::{BidNew, BidView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Bid, NewBid, User};
use uuid::Uuid;

use crate::{ServerError, convert::bid_status, server::ServerState};

pub(crate) fn bid_view(bid: Bid) -> BidView {
    BidView {
        id: bid.id,
        rfq_id: bid.rfq_id,
        supplier_id: bid.supplier_id,
        price_minor: bid.price_minor,
        delivery_days: bid.delivery_days,
        note: bid.note,
        status: bid_status::to_wire(bid.status),
        created_at: bid.created_at,
        updated_at: bid.updated_at,
    }
}

/// Bids on one RFQ: all of them for its owner, the caller's own otherwise.
pub async fn list_for_rfq(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(rfq_id): Path<Uuid>,
) -> Result<Json<Vec<BidView>>, ServerError> {
    let bids = state
        .engine
        .list_rfq_bids(&user.username, rfq_id)
        .await?
        .into_iter()
        .map(bid_view)
        .collect();
    Ok(Json(bids))
}

pub async fn submit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(rfq_id): Path<Uuid>,
    Json(payload): Json<BidNew>,
) -> Result<(StatusCode, Json<BidView>), ServerError> {
    let bid = state
        .engine
        .submit_bid(
            &user.username,
            rfq_id,
            NewBid {
                price_minor: payload.price_minor,
                delivery_days: payload.delivery_days,
                note: payload.note,
            },
        )
        .await?;
    tracing::info!("bid {} on rfq {} by {}", bid.id, rfq_id, user.username);
    Ok((StatusCode::CREATED, Json(bid_view(bid))))
}

pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BidView>>, ServerError> {
    let bids = state
        .engine
        .list_my_bids(&user.username)
        .await?
        .into_iter()
        .map(bid_view)
        .collect();
    Ok(Json(bids))
}

pub async fn accept(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BidView>, ServerError> {
    let bid = state.engine.accept_bid(&user.username, id).await?;
    tracing::info!("bid {} accepted, rfq {} awarded", bid.id, bid.rfq_id);
    Ok(Json(bid_view(bid)))
}

pub async fn reject(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BidView>, ServerError> {
    let bid = state.engine.reject_bid(&user.username, id).await?;
    Ok(Json(bid_view(bid)))
}

pub async fn withdraw(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BidView>, ServerError> {
    let bid = state.engine.withdraw_bid(&user.username, id).await?;
    Ok(Json(bid_view(bid)))
}
