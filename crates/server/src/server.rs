use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{
    acl, analytics, assistant::Assistant, bids, challenges, chat, contracts, messages,
    organizations, records, rfqs, teams, transactions, user,
};
use engine::{Engine, User};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub assistant: Arc<Assistant>,
}

impl ServerState {
    pub fn new(engine: Engine, assistant: Assistant) -> Self {
        Self {
            engine: Arc::new(engine),
            assistant: Arc::new(assistant),
        }
    }
}

/// HTTP Basic authentication against the stored argon2 hash.
///
/// The authenticated [`User`] is inserted into the request extensions.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let found = state
        .engine
        .user_credentials(credentials.username())
        .await
        .map_err(|err| {
            tracing::error!("credential lookup failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    let Some((user, hash)) = found else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    // argon2 is deliberately slow; keep it off the async workers.
    let password = credentials.password().to_string();
    let verified = tokio::task::spawn_blocking(move || engine::verify_password(&password, &hash))
        .await
        .map_err(|err| {
            tracing::error!("password verification task failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if !verified {
        tracing::debug!("rejected credentials for {}", user.username);
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert::<User>(user);
    Ok(next.run(request).await)
}

fn protected_routes(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/user", get(user::me))
        .route("/supplier", put(user::upsert_supplier))
        .route("/suppliers", get(user::list_suppliers))
        .route("/suppliers/{username}", get(user::get_supplier))
        .route("/suppliers/{username}/verify", post(user::verify_supplier))
        .route("/rfqs", get(rfqs::list).post(rfqs::create))
        .route("/rfqs/{id}", get(rfqs::get).patch(rfqs::update))
        .route("/rfqs/{id}/bids", get(bids::list_for_rfq).post(bids::submit))
        .route("/bids", get(bids::mine))
        .route("/bids/{id}/accept", post(bids::accept))
        .route("/bids/{id}/reject", post(bids::reject))
        .route("/bids/{id}/withdraw", post(bids::withdraw))
        .route("/contracts", get(contracts::list).post(contracts::create))
        .route("/contracts/{id}", get(contracts::get))
        .route("/contracts/{id}/status", patch(contracts::update_status))
        .route("/messages", get(messages::list).post(messages::send))
        .route("/messages/{id}/read", post(messages::mark_read))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/wallet", get(transactions::wallet))
        .route(
            "/organizations",
            get(organizations::list).post(organizations::create),
        )
        .route(
            "/organizations/{id}/members",
            get(organizations::list_members).post(organizations::upsert_member),
        )
        .route(
            "/organizations/{id}/members/{username}",
            axum::routing::delete(organizations::remove_member),
        )
        .route("/teams", get(teams::list).post(teams::create))
        .route(
            "/teams/{id}/members",
            get(teams::list_members).post(teams::add_member),
        )
        .route(
            "/teams/{id}/members/{username}",
            patch(teams::update_member).delete(teams::remove_member),
        )
        .route("/acls", get(acl::list).post(acl::create))
        .route("/acls/{id}/rules", post(acl::add_rule))
        .route("/acls/{id}/assignments", post(acl::assign))
        .route("/permissions", post(acl::grant))
        .route("/permissions/check", get(acl::check))
        .route("/analytics/summary", get(analytics::summary))
        .route("/analytics/export/{format}", get(analytics::export))
        .route("/chat", post(chat::send))
        .route("/ai/analyze-rfq", post(chat::analyze_rfq))
        .route("/challenges", get(challenges::list))
        .route("/challenges/{id}", get(challenges::get))
        .route("/challenges/{id}/score", post(challenges::score))
        .route("/records/{kind}/{id}/verify", get(records::verify))
        .route_layer(middleware::from_fn_with_state(state, auth))
}

/// The full API, mounted under `/api`.
pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/register", post(user::register))
        .merge(protected_routes(state.clone()));

    Router::new().nest("/api", api).with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
