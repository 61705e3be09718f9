use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    ContractDraft, Engine, EngineError, Money, NewBid, NewRfq, NewTransaction, NewUser,
    RecordKind, TransactionKind, UserRole,
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

fn simple(kind: TransactionKind, amount_minor: i64) -> NewTransaction {
    NewTransaction {
        kind,
        amount_minor,
        counterparty_id: None,
        contract_id: None,
        note: None,
    }
}

#[tokio::test]
async fn deposit_and_withdraw() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(engine.wallet_balance("alice").await.unwrap(), Money::ZERO);

    let deposit = engine
        .record_transaction("alice", simple(TransactionKind::Deposit, 10_000))
        .await
        .unwrap();
    assert_eq!(deposit.balance_after_minor, 10_000);
    assert!(deposit.blockchain_hash.is_some());

    let withdrawal = engine
        .record_transaction("alice", simple(TransactionKind::Withdrawal, 2_500))
        .await
        .unwrap();
    assert_eq!(withdrawal.balance_after_minor, 7_500);
    assert_eq!(engine.wallet_balance("alice").await.unwrap(), Money::new(7_500));
    assert_eq!(engine.list_transactions("alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn debits_never_overdraw() {
    let (engine, _db) = engine_with_db().await;
    engine
        .record_transaction("alice", simple(TransactionKind::Deposit, 1_000))
        .await
        .unwrap();

    let err = engine
        .record_transaction("alice", simple(TransactionKind::Withdrawal, 1_001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    // The failed debit left no trace.
    assert_eq!(engine.wallet_balance("alice").await.unwrap(), Money::new(1_000));
    assert_eq!(engine.list_transactions("alice").await.unwrap().len(), 1);

    assert!(matches!(
        engine
            .record_transaction("alice", simple(TransactionKind::Fee, -5))
            .await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn payment_credits_the_counterparty() {
    let (engine, _db) = engine_with_db().await;
    engine
        .record_transaction("alice", simple(TransactionKind::Deposit, 50_000))
        .await
        .unwrap();

    let payment = engine
        .record_transaction(
            "alice",
            NewTransaction {
                counterparty_id: Some("bob".to_string()),
                ..simple(TransactionKind::Payment, 20_000)
            },
        )
        .await
        .unwrap();
    assert_eq!(payment.balance_after_minor, 30_000);
    assert_eq!(engine.wallet_balance("bob").await.unwrap(), Money::new(20_000));

    // Both parties see the payment.
    let bob_history = engine.list_transactions("bob").await.unwrap();
    assert_eq!(bob_history.len(), 1);
    assert_eq!(bob_history[0].id, payment.id);

    assert!(matches!(
        engine
            .record_transaction(
                "alice",
                NewTransaction {
                    counterparty_id: Some("alice".to_string()),
                    ..simple(TransactionKind::Payment, 1)
                },
            )
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine
            .record_transaction(
                "alice",
                NewTransaction {
                    counterparty_id: Some("bob".to_string()),
                    ..simple(TransactionKind::Deposit, 1)
                },
            )
            .await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn contract_payment_goes_to_supplier() {
    let (engine, _db) = engine_with_db().await;
    let rfq = engine
        .create_rfq(
            "alice",
            NewRfq {
                title: "Cement".to_string(),
                description: "OPC 53 grade".to_string(),
                category: "construction".to_string(),
                quantity: 100,
                budget_minor: None,
                deadline: Utc::now() + Duration::days(3),
                draft: false,
            },
        )
        .await
        .unwrap();
    let bid = engine
        .submit_bid(
            "bob",
            rfq.id,
            NewBid {
                price_minor: 9_000,
                delivery_days: 5,
                note: None,
            },
        )
        .await
        .unwrap();
    engine.accept_bid("alice", bid.id).await.unwrap();
    let contract = engine
        .create_contract(
            "alice",
            ContractDraft {
                bid_id: bid.id,
                title: None,
                terms: "Advance payment".to_string(),
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap();
    engine
        .record_transaction("alice", simple(TransactionKind::Deposit, 9_000))
        .await
        .unwrap();
    engine
        .record_transaction(
            "bob",
            simple(TransactionKind::Deposit, 100),
        )
        .await
        .unwrap();

    // The supplier cannot pay against the contract.
    assert!(matches!(
        engine
            .record_transaction(
                "bob",
                NewTransaction {
                    contract_id: Some(contract.id),
                    ..simple(TransactionKind::Payment, 100)
                },
            )
            .await,
        Err(EngineError::Forbidden(_))
    ));
    // Outsiders cannot reference it at all.
    assert!(matches!(
        engine
            .record_transaction(
                "carol",
                NewTransaction {
                    contract_id: Some(contract.id),
                    ..simple(TransactionKind::Fee, 1)
                },
            )
            .await,
        Err(EngineError::Forbidden(_))
    ));

    let payment = engine
        .record_transaction(
            "alice",
            NewTransaction {
                contract_id: Some(contract.id),
                ..simple(TransactionKind::Payment, 9_000)
            },
        )
        .await
        .unwrap();
    assert_eq!(payment.counterparty_id.as_deref(), Some("bob"));
    assert_eq!(engine.wallet_balance("alice").await.unwrap(), Money::ZERO);
    assert_eq!(engine.wallet_balance("bob").await.unwrap(), Money::new(9_100));
}

#[tokio::test]
async fn transaction_records_verify_and_are_private() {
    let (engine, db) = engine_with_db().await;
    let entry = engine
        .record_transaction("alice", simple(TransactionKind::Deposit, 700))
        .await
        .unwrap();

    let verification = engine
        .verify_record("alice", RecordKind::Transaction, entry.id)
        .await
        .unwrap();
    assert!(verification.valid);
    assert!(matches!(
        engine
            .verify_record("bob", RecordKind::Transaction, entry.id)
            .await,
        Err(EngineError::Forbidden(_))
    ));

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE transactions SET amount_minor = ? WHERE id = ?",
        vec![70_000_i64.into(), entry.id.to_string().into()],
    ))
    .await
    .unwrap();
    let tampered = engine
        .verify_record("alice", RecordKind::Transaction, entry.id)
        .await
        .unwrap();
    assert!(!tampered.valid);
}

#[tokio::test]
async fn credits_never_overflow_the_balance() {
    let (engine, _db) = engine_with_db().await;
    engine
        .record_transaction("bob", simple(TransactionKind::Deposit, i64::MAX))
        .await
        .unwrap();
    assert!(matches!(
        engine
            .record_transaction("bob", simple(TransactionKind::Refund, 1))
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert_eq!(engine.wallet_balance("bob").await.unwrap(), Money::new(i64::MAX));

    // The payer's debit rolls back with the failed counterparty credit.
    engine
        .record_transaction("alice", simple(TransactionKind::Deposit, 500))
        .await
        .unwrap();
    let payment = NewTransaction {
        counterparty_id: Some("bob".to_string()),
        ..simple(TransactionKind::Payment, 200)
    };
    assert!(matches!(
        engine.record_transaction("alice", payment).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert_eq!(engine.wallet_balance("alice").await.unwrap(), Money::new(500));
    assert_eq!(engine.list_transactions("alice").await.unwrap().len(), 1);
    assert_eq!(engine.list_transactions("bob").await.unwrap().len(), 1);
}
