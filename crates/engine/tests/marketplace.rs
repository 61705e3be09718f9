use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BidStatus, ContractDraft, ContractStatus, Engine, EngineError, NewBid, NewMessage, NewRfq,
    NewUser, RecordKind, RfqListFilter, RfqStatus, RfqUpdate, UserRole,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    for (username, role) in [
        ("alice", UserRole::Buyer),
        ("bob", UserRole::Supplier),
        ("carol", UserRole::Supplier),
        ("dave", UserRole::Both),
    ] {
        engine
            .register_user(NewUser {
                username: username.to_string(),
                password: "password".to_string(),
                email: format!("{username}@example.com"),
                full_name: None,
                company_name: None,
                role,
            })
            .await
            .unwrap();
    }
    (engine, db)
}

fn steel_rfq() -> NewRfq {
    NewRfq {
        title: "Steel pipes".to_string(),
        description: "50mm galvanized".to_string(),
        category: "Metals".to_string(),
        quantity: 500,
        budget_minor: Some(5_000_000),
        deadline: Utc::now() + Duration::days(7),
        draft: false,
    }
}

fn bid(price_minor: i64) -> NewBid {
    NewBid {
        price_minor,
        delivery_days: 10,
        note: None,
    }
}

#[tokio::test]
async fn register_rejects_admin_and_duplicates() {
    let (engine, _db) = engine_with_db().await;
    let mut new_user = NewUser {
        username: "mallory".to_string(),
        password: "pw".to_string(),
        email: "m@example.com".to_string(),
        full_name: None,
        company_name: None,
        role: UserRole::Admin,
    };
    assert!(matches!(
        engine.register_user(new_user.clone()).await,
        Err(EngineError::Forbidden(_))
    ));
    new_user.username = "alice".to_string();
    new_user.role = UserRole::Buyer;
    assert!(matches!(
        engine.register_user(new_user).await,
        Err(EngineError::ExistingKey(_))
    ));
}

#[tokio::test]
async fn credentials_verify_against_argon2_hash() {
    let (engine, _db) = engine_with_db().await;
    let (user, hash) = engine.user_credentials("alice").await.unwrap().unwrap();
    assert_eq!(user.role, UserRole::Buyer);
    assert!(engine::verify_password("password", &hash));
    assert!(!engine::verify_password("nope", &hash));
    assert!(engine.user_credentials("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn create_rfq_is_open_and_owned() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
    assert_eq!(rfq.status, RfqStatus::Open);
    assert_eq!(rfq.user_id, "alice");
    assert_eq!(rfq.category, "metals");
    assert!(rfq.blockchain_hash.is_some());

    let fetched = engine.rfq("bob", rfq.id).await.unwrap();
    assert_eq!(fetched, rfq);

    // Suppliers cannot publish RFQs.
    assert!(matches!(
        engine.create_rfq("bob", steel_rfq()).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn drafts_are_private() {
    let (engine, _db) = engine_with_db().await;
    let mut new_rfq = steel_rfq();
    new_rfq.draft = true;
    let draft = engine.create_rfq("alice", new_rfq).await.unwrap();

    assert!(matches!(
        engine.rfq("bob", draft.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    let listed = engine
        .list_rfqs("bob", RfqListFilter::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
    let own = engine
        .list_rfqs("alice", RfqListFilter::default())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
}

#[tokio::test]
async fn only_owner_updates_rfq_and_transitions_are_checked() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();

    let err = engine
        .update_rfq(
            "bob",
            rfq.id,
            RfqUpdate {
                title: Some("mine now".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let updated = engine
        .update_rfq(
            "alice",
            rfq.id,
            RfqUpdate {
                quantity: Some(750),
                status: Some(RfqStatus::InReview),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 750);
    assert_eq!(updated.status, RfqStatus::InReview);
    assert_ne!(updated.blockchain_hash, rfq.blockchain_hash);

    let cancelled = engine
        .update_rfq(
            "alice",
            rfq.id,
            RfqUpdate {
                status: Some(RfqStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status, RfqStatus::Cancelled);

    let err = engine
        .update_rfq(
            "alice",
            rfq.id,
            RfqUpdate {
                status: Some(RfqStatus::Open),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn bidding_rules() {
    let (engine, db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();

    // Buyers cannot bid; owners cannot bid on their own RFQ.
    assert!(matches!(
        engine.submit_bid("alice", rfq.id, bid(100)).await,
        Err(EngineError::Forbidden(_))
    ));
    let dave_rfq = engine.create_rfq("dave", steel_rfq()).await.unwrap();
    assert!(matches!(
        engine.submit_bid("dave", dave_rfq.id, bid(100)).await,
        Err(EngineError::Forbidden(_))
    ));

    assert!(matches!(
        engine.submit_bid("bob", rfq.id, bid(0)).await,
        Err(EngineError::InvalidInput(_))
    ));

    let first = engine.submit_bid("bob", rfq.id, bid(4_000_000)).await.unwrap();
    assert_eq!(first.status, BidStatus::Pending);
    assert!(matches!(
        engine.submit_bid("bob", rfq.id, bid(3_900_000)).await,
        Err(EngineError::ExistingKey(_))
    ));

    // A withdrawn bid frees the slot.
    engine.withdraw_bid("bob", first.id).await.unwrap();
    engine.submit_bid("bob", rfq.id, bid(3_900_000)).await.unwrap();

    // Passed deadline.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE rfqs SET deadline = ? WHERE id = ?",
        vec![
            (Utc::now() - Duration::days(1)).into(),
            rfq.id.to_string().into(),
        ],
    ))
    .await
    .unwrap();
    assert!(matches!(
        engine.submit_bid("carol", rfq.id, bid(3_800_000)).await,
        Err(EngineError::InvalidState(_))
    ));
}

#[tokio::test]
async fn bid_on_non_open_rfq_is_invalid_state() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
    engine
        .update_rfq(
            "alice",
            rfq.id,
            RfqUpdate {
                status: Some(RfqStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        engine.submit_bid("bob", rfq.id, bid(100)).await,
        Err(EngineError::InvalidState(_))
    ));
}

#[tokio::test]
async fn accept_awards_rfq_and_rejects_the_rest() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
    let bob = engine.submit_bid("bob", rfq.id, bid(4_000_000)).await.unwrap();
    let carol = engine.submit_bid("carol", rfq.id, bid(4_100_000)).await.unwrap();

    assert!(matches!(
        engine.accept_bid("bob", bob.id).await,
        Err(EngineError::Forbidden(_))
    ));

    let accepted = engine.accept_bid("alice", bob.id).await.unwrap();
    assert_eq!(accepted.status, BidStatus::Accepted);
    assert_eq!(
        engine.rfq("alice", rfq.id).await.unwrap().status,
        RfqStatus::Awarded
    );

    let bids = engine.list_rfq_bids("alice", rfq.id).await.unwrap();
    let carol_now = bids.iter().find(|b| b.id == carol.id).unwrap();
    assert_eq!(carol_now.status, BidStatus::Rejected);

    // Second acceptance on the same RFQ.
    assert!(matches!(
        engine.accept_bid("alice", carol.id).await,
        Err(EngineError::InvalidState(_))
    ));

    // Suppliers only see their own bids.
    let seen_by_carol = engine.list_rfq_bids("carol", rfq.id).await.unwrap();
    assert_eq!(seen_by_carol.len(), 1);
    assert_eq!(seen_by_carol[0].supplier_id, "carol");
}

#[tokio::test]
async fn contract_lifecycle_closes_rfq() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
    let bob = engine.submit_bid("bob", rfq.id, bid(4_000_000)).await.unwrap();

    let draft = ContractDraft {
        bid_id: bob.id,
        title: None,
        terms: "Net 30".to_string(),
        start_date: None,
        end_date: None,
    };
    assert!(matches!(
        engine.create_contract("alice", draft.clone()).await,
        Err(EngineError::InvalidState(_))
    ));

    engine.accept_bid("alice", bob.id).await.unwrap();
    assert!(matches!(
        engine.create_contract("bob", draft.clone()).await,
        Err(EngineError::Forbidden(_))
    ));
    let contract = engine.create_contract("alice", draft.clone()).await.unwrap();
    assert_eq!(contract.status, ContractStatus::Draft);
    assert_eq!(contract.value_minor, 4_000_000);
    assert_eq!(contract.title, "Steel pipes");
    assert!(matches!(
        engine.create_contract("alice", draft).await,
        Err(EngineError::ExistingKey(_))
    ));

    assert!(matches!(
        engine.contract("carol", contract.id).await,
        Err(EngineError::Forbidden(_))
    ));

    engine
        .update_contract_status("alice", contract.id, ContractStatus::PendingApproval)
        .await
        .unwrap();
    assert!(matches!(
        engine
            .update_contract_status("alice", contract.id, ContractStatus::Active)
            .await,
        Err(EngineError::Forbidden(_))
    ));
    let active = engine
        .update_contract_status("bob", contract.id, ContractStatus::Active)
        .await
        .unwrap();
    assert!(active.start_date.is_some());
    assert!(matches!(
        engine
            .update_contract_status("bob", contract.id, ContractStatus::Draft)
            .await,
        Err(EngineError::InvalidState(_))
    ));

    engine
        .update_contract_status("alice", contract.id, ContractStatus::Completed)
        .await
        .unwrap();
    assert_eq!(
        engine.rfq("alice", rfq.id).await.unwrap().status,
        RfqStatus::Closed
    );
    assert_eq!(engine.list_contracts("bob").await.unwrap().len(), 1);
    assert!(engine.list_contracts("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn messages_are_delivered_on_listing_and_read_by_receiver() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
    let message = engine
        .send_message(
            "bob",
            NewMessage {
                receiver_id: "alice".to_string(),
                content: "Can you share drawings?".to_string(),
                rfq_id: Some(rfq.id),
                bid_id: None,
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        engine
            .send_message(
                "bob",
                NewMessage {
                    receiver_id: "bob".to_string(),
                    content: "hi me".to_string(),
                    rfq_id: None,
                    bid_id: None,
                },
            )
            .await,
        Err(EngineError::InvalidInput(_))
    ));

    let sent_view = engine.list_messages("bob", Default::default()).await.unwrap();
    assert_eq!(sent_view[0].status, engine::MessageStatus::Sent);

    let inbox = engine.list_messages("alice", Default::default()).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].status, engine::MessageStatus::Delivered);

    assert!(matches!(
        engine.mark_message_read("bob", message.id).await,
        Err(EngineError::Forbidden(_))
    ));
    let read = engine.mark_message_read("alice", message.id).await.unwrap();
    assert_eq!(read.status, engine::MessageStatus::Read);
}

#[tokio::test]
async fn record_verification_detects_tampering() {
    let (engine, db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();

    let ok = engine
        .verify_record("bob", RecordKind::Rfq, rfq.id)
        .await
        .unwrap();
    assert!(ok.valid);

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE rfqs SET quantity = ? WHERE id = ?",
        vec![1_i64.into(), rfq.id.to_string().into()],
    ))
    .await
    .unwrap();

    let tampered = engine
        .verify_record("bob", RecordKind::Rfq, rfq.id)
        .await
        .unwrap();
    assert!(!tampered.valid);
    assert_eq!(tampered.stored_hash, rfq.blockchain_hash);
}

#[tokio::test]
async fn analytics_summary_counts_own_activity() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
    engine.create_rfq("alice", steel_rfq()).await.unwrap();
    let bob = engine.submit_bid("bob", rfq.id, bid(4_000_000)).await.unwrap();
    engine.submit_bid("carol", rfq.id, bid(3_000_000)).await.unwrap();
    engine.accept_bid("alice", bob.id).await.unwrap();

    let summary = engine.analytics_summary("alice").await.unwrap();
    assert_eq!(summary.scope, engine::AnalyticsScope::Own);
    assert_eq!(summary.total_rfqs, 2);
    assert_eq!(summary.open_rfqs, 1);
    assert_eq!(summary.awarded_rfqs, 1);
    assert_eq!(summary.total_bids, 2);
    assert_eq!(summary.accepted_bids, 1);
    assert_eq!(summary.average_bid_minor, 3_500_000);

    let bob_summary = engine.analytics_summary("bob").await.unwrap();
    assert_eq!(bob_summary.total_rfqs, 0);
    assert_eq!(bob_summary.total_bids, 1);
}

#[tokio::test]
async fn accept_on_closed_rfq_leaves_bid_pending() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
    let bob = engine.submit_bid("bob", rfq.id, bid(4_000_000)).await.unwrap();
    engine
        .update_rfq(
            "alice",
            rfq.id,
            RfqUpdate {
                status: Some(RfqStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        engine.accept_bid("alice", bob.id).await,
        Err(EngineError::InvalidState(_))
    ));
    let bids = engine.list_rfq_bids("alice", rfq.id).await.unwrap();
    assert_eq!(bids[0].status, BidStatus::Pending);
    assert_eq!(
        engine.rfq("alice", rfq.id).await.unwrap().status,
        RfqStatus::Closed
    );
}

#[tokio::test]
async fn analytics_totals_saturate_on_huge_amounts() {
    let (engine, _db) = engine_with_db().await;
    let mut awarded = Vec::new();
    for supplier in ["bob", "carol"] {
        let rfq = engine.create_rfq("alice", steel_rfq()).await.unwrap();
        let placed = engine
            .submit_bid(supplier, rfq.id, bid(i64::MAX))
            .await
            .unwrap();
        awarded.push(placed);
    }

    let summary = engine.analytics_summary("alice").await.unwrap();
    assert_eq!(summary.total_bids, 2);
    assert_eq!(summary.average_bid_minor, i64::MAX);

    for placed in awarded {
        engine.accept_bid("alice", placed.id).await.unwrap();
        engine
            .create_contract(
                "alice",
                ContractDraft {
                    bid_id: placed.id,
                    title: None,
                    terms: "Net 30".to_string(),
                    start_date: None,
                    end_date: None,
                },
            )
            .await
            .unwrap();
    }

    let report = engine.analytics_report("alice").await.unwrap();
    assert_eq!(report.summary.total_contracts, 2);
    assert_eq!(report.summary.total_contract_value_minor, i64::MAX);
    assert_eq!(report.rfqs.len(), 2);
    assert_eq!(report.bids.len(), 2);
    assert_eq!(report.summary.awarded_rfqs, 2);
}
