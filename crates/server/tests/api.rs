use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use server::{Assistant, ServerState, router};

const PASSWORD: &str = "s3cret-pass";

async fn app() -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let app = router(ServerState::new(engine, Assistant::canned()));

    for (username, role) in [
        ("alice", "buyer"),
        ("bob", "supplier"),
        ("carol", "supplier"),
    ] {
        let (status, _) = call(
            &app,
            "POST",
            "/api/register",
            None,
            Some(json!({
                "username": username,
                "password": PASSWORD,
                "email": format!("{username}@example.com"),
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    (app, db)
}

fn basic(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{username}:{password}"))
    )
}

async fn call_raw(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic(user, PASSWORD));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = call_raw(app, method, uri, user, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_rfq(app: &Router, owner: &str) -> String {
    let (status, rfq) = call(
        app,
        "POST",
        "/api/rfqs",
        Some(owner),
        Some(json!({
            "title": "Steel pipes",
            "description": "50mm galvanized, IS 1239",
            "category": "metals",
            "quantity": 500,
            "budget_minor": 5_000_000,
            "deadline": (Utc::now() + Duration::days(7)).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    rfq["id"].as_str().unwrap().to_string()
}

async fn submit_bid(app: &Router, rfq_id: &str, supplier: &str, price: i64) -> String {
    let (status, bid) = call(
        app,
        "POST",
        &format!("/api/rfqs/{rfq_id}/bids"),
        Some(supplier),
        Some(json!({ "price_minor": price, "delivery_days": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    bid["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn credentials_are_required_and_checked() {
    let (app, _db) = app().await;

    let (status, _) = call(&app, "GET", "/api/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/user")
        .header(header::AUTHORIZATION, basic("alice", "wrong"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, me) = call(&app, "GET", "/api/user", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["role"], "buyer");
    assert_eq!(me["wallet_balance_minor"], 0);
}

#[tokio::test]
async fn registration_refuses_admin_and_duplicates() {
    let (app, _db) = app().await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": "mallory",
            "password": PASSWORD,
            "email": "m@example.com",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": "alice",
            "password": PASSWORD,
            "email": "alice2@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_rfq_returns_201_owned_by_caller() {
    let (app, _db) = app().await;
    let id = create_rfq(&app, "alice").await;

    let (status, rfq) = call(&app, "GET", &format!("/api/rfqs/{id}"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rfq["user_id"], "alice");
    assert_eq!(rfq["status"], "open");
    assert_eq!(rfq["quantity"], 500);

    let (status, mine) = call(&app, "GET", "/api/rfqs?mine=true", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_owner_cannot_patch_rfq() {
    let (app, _db) = app().await;
    let id = create_rfq(&app, "alice").await;

    let (status, body) = call(
        &app,
        "PATCH",
        &format!("/api/rfqs/{id}"),
        Some("bob"),
        Some(json!({ "title": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, rfq) = call(
        &app,
        "PATCH",
        &format!("/api/rfqs/{id}"),
        Some("alice"),
        Some(json!({ "budget_minor": null, "status": "in_review" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rfq["budget_minor"], Value::Null);
    assert_eq!(rfq["status"], "in_review");
}

#[tokio::test]
async fn bid_on_non_open_rfq_is_400() {
    let (app, _db) = app().await;
    let id = create_rfq(&app, "alice").await;
    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/rfqs/{id}"),
        Some("alice"),
        Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/rfqs/{id}/bids"),
        Some("bob"),
        Some(json!({ "price_minor": 100, "delivery_days": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn accepting_a_bid_awards_the_rfq_once() {
    let (app, _db) = app().await;
    let rfq_id = create_rfq(&app, "alice").await;
    let bob_bid = submit_bid(&app, &rfq_id, "bob", 4_000_000).await;
    let carol_bid = submit_bid(&app, &rfq_id, "carol", 4_200_000).await;

    let (status, bid) = call(
        &app,
        "POST",
        &format!("/api/bids/{bob_bid}/accept"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bid["status"], "accepted");

    let (_, rfq) = call(&app, "GET", &format!("/api/rfqs/{rfq_id}"), Some("alice"), None).await;
    assert_eq!(rfq["status"], "awarded");

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/bids/{carol_bid}/accept"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The accepted bid turns into a contract the supplier approves.
    let (status, contract) = call(
        &app,
        "POST",
        "/api/contracts",
        Some("alice"),
        Some(json!({ "bid_id": bob_bid, "terms": "Net 30" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let contract_id = contract["id"].as_str().unwrap().to_string();
    assert_eq!(contract["value_minor"], 4_000_000);

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/contracts/{contract_id}/status"),
        Some("alice"),
        Some(json!({ "status": "pending_approval" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, contract) = call(
        &app,
        "PATCH",
        &format!("/api/contracts/{contract_id}/status"),
        Some("bob"),
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contract["status"], "active");

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/contracts/{contract_id}"),
        Some("carol"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn csv_summary_export_matches_computed_counts() {
    let (app, _db) = app().await;
    let rfq_id = create_rfq(&app, "alice").await;
    create_rfq(&app, "alice").await;
    let bob_bid = submit_bid(&app, &rfq_id, "bob", 4_000_000).await;
    submit_bid(&app, &rfq_id, "carol", 3_000_000).await;
    call(
        &app,
        "POST",
        &format!("/api/bids/{bob_bid}/accept"),
        Some("alice"),
        None,
    )
    .await;

    let (status, bytes) = call_raw(
        &app,
        "GET",
        "/api/analytics/export/csv?type=summary",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "metric,value",
            "total_rfqs,2",
            "open_rfqs,1",
            "awarded_rfqs,1",
            "total_bids,2",
            "accepted_bids,1",
            "average_bid_minor,3500000",
            "total_contracts,0",
            "active_contracts,0",
            "total_contract_value_minor,0",
        ]
    );

    let (_, summary) = call(&app, "GET", "/api/analytics/summary", Some("alice"), None).await;
    assert_eq!(summary["total_rfqs"], 2);
    assert_eq!(summary["scope"], "own");

    let (status, bytes) = call_raw(
        &app,
        "GET",
        "/api/analytics/export/excel?type=all",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..2], b"PK");

    let (status, _) = call(
        &app,
        "GET",
        "/api/analytics/export/docx",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(
        &app,
        "GET",
        "/api/analytics/export/pdf?type=everything",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn removing_last_team_admin_is_400() {
    let (app, _db) = app().await;
    let (status, team) = call(
        &app,
        "POST",
        "/api/teams",
        Some("alice"),
        Some(json!({ "name": "Sourcing" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let team_id = team["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/teams/{team_id}/members"),
        Some("alice"),
        Some(json!({ "username": "bob", "role": "member" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        "DELETE",
        &format!("/api/teams/{team_id}/members/alice"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("last team admin"));

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/teams/{team_id}/members/bob"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, members) = call(
        &app,
        "GET",
        &format!("/api/teams/{team_id}/members"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(members["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn wallet_never_overdraws_and_payments_credit_counterparty() {
    let (app, _db) = app().await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/transactions",
        Some("alice"),
        Some(json!({ "kind": "deposit", "amount_minor": 10_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &app,
        "POST",
        "/api/transactions",
        Some("alice"),
        Some(json!({ "kind": "withdrawal", "amount_minor": 10_001 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, payment) = call(
        &app,
        "POST",
        "/api/transactions",
        Some("alice"),
        Some(json!({ "kind": "payment", "amount_minor": 4_000, "counterparty_id": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["balance_after_minor"], 6_000);

    let (_, wallet) = call(&app, "GET", "/api/wallet", Some("bob"), None).await;
    assert_eq!(wallet["balance_minor"], 4_000);
    assert_eq!(wallet["balance"], "₹40.00");

    let (_, history) = call(&app, "GET", "/api/transactions", Some("bob"), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn record_verification_detects_tampering() {
    let (app, db) = app().await;
    let id = create_rfq(&app, "alice").await;

    let (status, record) = call(
        &app,
        "GET",
        &format!("/api/records/rfq/{id}/verify"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["valid"], true);

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE rfqs SET title = ? WHERE id = ?",
        vec!["Copper pipes".into(), id.clone().into()],
    ))
    .await
    .unwrap();

    let (_, record) = call(
        &app,
        "GET",
        &format!("/api/records/rfq/{id}/verify"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(record["valid"], false);
    assert_ne!(record["stored_hash"], record["computed_hash"]);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/records/invoice/{id}/verify"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn challenge_scoring_sums_correct_weights() {
    let (app, _db) = app().await;
    let (status, catalog) = call(&app, "GET", "/api/challenges", Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        catalog
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["id"] == "rfq-basics")
    );

    let (_, challenge) = call(&app, "GET", "/api/challenges/rfq-basics", Some("bob"), None).await;
    let steps = challenge["steps"].as_array().unwrap();
    assert!(steps.iter().all(|step| step.get("correct").is_none()));

    // scope (w3) and budget (w1) right, deadline (w2) wrong.
    let (status, score) = call(
        &app,
        "POST",
        "/api/challenges/rfq-basics/score",
        Some("bob"),
        Some(json!({ "answers": { "scope": 1, "deadline": 0, "budget": 0 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["earned"], 4);
    assert_eq!(score["possible"], 6);
    assert_eq!(score["percentage"], 66);
    assert_eq!(score["complete"], true);

    let (status, _) = call(
        &app,
        "POST",
        "/api/challenges/rfq-basics/score",
        Some("bob"),
        Some(json!({ "answers": { "nope": 0 } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn chat_appends_assistant_reply() {
    let (app, _db) = app().await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/chat",
        Some("alice"),
        Some(json!({ "message": "How do I pick a supplier?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");

    let rfq_id = create_rfq(&app, "alice").await;
    let (status, analysis) = call(
        &app,
        "POST",
        "/api/ai/analyze-rfq",
        Some("alice"),
        Some(json!({ "rfq_id": rfq_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(analysis["analysis"].as_str().unwrap().contains("per unit"));
}

#[tokio::test]
async fn unreachable_openai_is_reported_in_transcript() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build().await.unwrap();
    engine
        .create_user(engine::NewUser {
            username: "alice".to_string(),
            password: PASSWORD.to_string(),
            email: "alice@example.com".to_string(),
            full_name: None,
            company_name: None,
            role: engine::UserRole::Buyer,
        })
        .await
        .unwrap();
    // Port 9 (discard) on localhost refuses connections.
    let assistant = Assistant::openai(
        "test-key".to_string(),
        None,
        Some("http://127.0.0.1:9/v1".to_string()),
    );
    let app = router(ServerState::new(engine, assistant));

    let (status, body) = call(
        &app,
        "POST",
        "/api/chat",
        Some("alice"),
        Some(json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(
        messages[1]["content"]
            .as_str()
            .unwrap()
            .contains("could not reach")
    );
}
