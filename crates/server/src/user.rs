//! Registration, the current user, and supplier profiles.

use api_types::{
    supplier::{SupplierListQuery, SupplierUpsert, SupplierVerify, SupplierView},
    user::{RegisterUser, UserRole, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewUser, Supplier, SupplierProfile, User};

use crate::{ServerError, convert::user_role, server::ServerState};

pub(crate) fn user_view(user: User) -> UserView {
    UserView {
        username: user.username,
        email: user.email,
        full_name: user.full_name,
        company_name: user.company_name,
        role: user_role::to_wire(user.role),
        wallet_balance_minor: user.wallet_balance_minor,
        created_at: user.created_at,
    }
}

fn supplier_view(supplier: Supplier) -> SupplierView {
    SupplierView {
        username: supplier.user_id,
        industry: supplier.industry,
        description: supplier.description,
        risk_score: supplier.risk_score,
        verified: supplier.verified,
        created_at: supplier.created_at,
    }
}

/// Public sign-up. The `admin` role cannot be self-assigned.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let role = user_role::to_engine(payload.role.unwrap_or(UserRole::Buyer));
    let user = state
        .engine
        .register_user(NewUser {
            username: payload.username,
            password: payload.password,
            email: payload.email,
            full_name: payload.full_name,
            company_name: payload.company_name,
            role,
        })
        .await?;
    tracing::info!("registered user {} as {}", user.username, user.role.as_str());
    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn me(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    // Re-read so the wallet balance is current.
    let user = state.engine.user(&user.username).await?;
    Ok(Json(user_view(user)))
}

pub async fn upsert_supplier(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<SupplierUpsert>,
) -> Result<Json<SupplierView>, ServerError> {
    let supplier = state
        .engine
        .upsert_supplier(
            &user.username,
            SupplierProfile {
                industry: payload.industry,
                description: payload.description,
            },
        )
        .await?;
    Ok(Json(supplier_view(supplier)))
}

pub async fn list_suppliers(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<SupplierListQuery>,
) -> Result<Json<Vec<SupplierView>>, ServerError> {
    let suppliers = state
        .engine
        .list_suppliers(query.verified.unwrap_or(false))
        .await?
        .into_iter()
        .map(supplier_view)
        .collect();
    Ok(Json(suppliers))
}

pub async fn get_supplier(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<SupplierView>, ServerError> {
    let supplier = state.engine.supplier(&username).await?;
    Ok(Json(supplier_view(supplier)))
}

pub async fn verify_supplier(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(payload): Json<SupplierVerify>,
) -> Result<Json<SupplierView>, ServerError> {
    let supplier = state
        .engine
        .verify_supplier(
            &user.username,
            &username,
            payload.verified,
            payload.risk_score,
        )
        .await?;
    tracing::info!(
        "supplier {} verification set to {} by {}",
        supplier.user_id,
        supplier.verified,
        user.username
    );
    Ok(Json(supplier_view(supplier)))
}
