use chrono::{Duration, FixedOffset, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Account, DepositRequestCmd, DirectRefundCmd, Engine, EngineError, RefundRequestCmd,
    RegisterAccountCmd, TransactionKind, TransactionListFilter, TransactionStatus,
    WithdrawalRequestCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

async fn customer(engine: &Engine, login: &str) -> Account {
    engine
        .register_account(RegisterAccountCmd::new("Mario", login, "hunter2", Utc::now()))
        .await
        .unwrap()
}

/// Funds an account through the regular deposit flow.
async fn fund(engine: &Engine, account: &Account, amount_minor: i64) {
    let id = engine
        .request_deposit(DepositRequestCmd::new(account.id, amount_minor, Utc::now()))
        .await
        .unwrap();
    engine.approve(id, None).await.unwrap();
}

async fn balance_of(engine: &Engine, account: &Account) -> i64 {
    engine.account(account.id).await.unwrap().balance_minor
}

#[tokio::test]
async fn deposit_credits_only_on_approval() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;

    let txn_id = engine
        .request_deposit(
            DepositRequestCmd::new(alice.id, 10_000, Utc::now()).receipt_ref("receipts/42.jpg"),
        )
        .await
        .unwrap();

    let tx = engine.transaction(txn_id).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.receipt_ref.as_deref(), Some("receipts/42.jpg"));
    assert_eq!(balance_of(&engine, &alice).await, 0);

    let tx = engine.approve(txn_id, None).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Approved);
    assert_eq!(balance_of(&engine, &alice).await, 10_000);
}

#[tokio::test]
async fn deposit_rejects_non_positive_amount() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;

    let err = engine
        .request_deposit(DepositRequestCmd::new(alice.id, 0, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("amount_minor must be > 0".to_string())
    );
}

#[tokio::test]
async fn withdrawal_debits_up_front_and_approval_keeps_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    fund(&engine, &alice, 100).await;

    let txn_id = engine
        .request_withdrawal(WithdrawalRequestCmd::new(
            alice.id,
            40,
            "card 1234 5678",
            Utc::now(),
        ))
        .await
        .unwrap();

    // Funds are reserved immediately.
    assert_eq!(balance_of(&engine, &alice).await, 60);
    let tx = engine.transaction(txn_id).await.unwrap();
    assert_eq!(tx.kind, TransactionKind::Withdrawal);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.amount_minor, 40);

    // Approval confirms the withdrawal without touching the balance again.
    let tx = engine.approve(txn_id, None).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Approved);
    assert_eq!(balance_of(&engine, &alice).await, 60);
}

#[tokio::test]
async fn withdrawal_rejection_returns_the_funds() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    fund(&engine, &alice, 100).await;

    let txn_id = engine
        .request_withdrawal(WithdrawalRequestCmd::new(alice.id, 40, "card", Utc::now()))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, &alice).await, 60);

    let tx = engine.reject(txn_id).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Rejected);
    assert_eq!(balance_of(&engine, &alice).await, 100);
}

#[tokio::test]
async fn withdrawal_beyond_balance_fails_and_leaves_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    fund(&engine, &alice, 30).await;

    let err = engine
        .request_withdrawal(WithdrawalRequestCmd::new(alice.id, 31, "card", Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(balance_of(&engine, &alice).await, 30);

    // No ledger row either: the debit and the insert commit together.
    let rows = engine
        .list_transactions(
            10,
            &TransactionListFilter {
                account_id: Some(alice.id),
                kinds: Some(vec![TransactionKind::Withdrawal]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn approve_is_idempotent_on_status() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;

    let txn_id = engine
        .request_deposit(DepositRequestCmd::new(alice.id, 500, Utc::now()))
        .await
        .unwrap();

    engine.approve(txn_id, None).await.unwrap();
    assert_eq!(balance_of(&engine, &alice).await, 500);

    // The second call must not double-credit.
    let tx = engine.approve(txn_id, None).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Approved);
    assert_eq!(balance_of(&engine, &alice).await, 500);
}

#[tokio::test]
async fn reject_after_approve_is_a_no_op() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    fund(&engine, &alice, 100).await;

    let txn_id = engine
        .request_withdrawal(WithdrawalRequestCmd::new(alice.id, 40, "card", Utc::now()))
        .await
        .unwrap();
    engine.approve(txn_id, None).await.unwrap();

    // Rejecting an approved withdrawal must not credit anything back.
    let tx = engine.reject(txn_id).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Approved);
    assert_eq!(balance_of(&engine, &alice).await, 60);
}

#[tokio::test]
async fn refund_request_credits_on_approval_with_manual_amount() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    fund(&engine, &alice, 100).await;

    let txn_id = engine
        .request_refund(RefundRequestCmd::new(alice.id, 20, "gift", Utc::now()))
        .await
        .unwrap();

    // A refund request debits nothing.
    assert_eq!(balance_of(&engine, &alice).await, 100);

    // Staff trim the amount before approving.
    let tx = engine.approve(txn_id, Some(15)).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Approved);
    assert_eq!(tx.amount_minor, 15);
    assert_eq!(balance_of(&engine, &alice).await, 115);
}

#[tokio::test]
async fn refund_request_rejection_moves_no_funds() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    fund(&engine, &alice, 100).await;

    let txn_id = engine
        .request_refund(RefundRequestCmd::new(alice.id, 20, "gift", Utc::now()))
        .await
        .unwrap();
    let tx = engine.reject(txn_id).await.unwrap();

    assert_eq!(tx.status, TransactionStatus::Rejected);
    assert_eq!(balance_of(&engine, &alice).await, 100);
}

#[tokio::test]
async fn direct_refund_credits_immediately() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;

    let txn_id = engine
        .process_refund(DirectRefundCmd::new(
            alice.id,
            250,
            "cancelled order",
            Utc::now(),
        ))
        .await
        .unwrap();

    let tx = engine.transaction(txn_id).await.unwrap();
    assert_eq!(tx.kind, TransactionKind::Refund);
    assert_eq!(tx.status, TransactionStatus::Approved);
    assert_eq!(balance_of(&engine, &alice).await, 250);
}

#[tokio::test]
async fn direct_refund_for_unknown_account_fails() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .process_refund(DirectRefundCmd::new(Uuid::new_v4(), 250, "oops", Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("account not exists".to_string())
    );
}

#[tokio::test]
async fn pending_requests_exclude_synchronous_charges() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    fund(&engine, &alice, 1_000).await;

    let deposit_id = engine
        .request_deposit(DepositRequestCmd::new(alice.id, 100, Utc::now()))
        .await
        .unwrap();
    let refund_id = engine
        .request_refund(RefundRequestCmd::new(alice.id, 50, "gift", Utc::now()))
        .await
        .unwrap();

    let pending = engine.pending_requests().await.unwrap();
    let ids: Vec<_> = pending.iter().map(|tx| tx.id).collect();
    assert!(ids.contains(&deposit_id));
    assert!(ids.contains(&refund_id));
    assert!(pending.iter().all(|tx| !tx.kind.is_income()));
}

#[tokio::test]
async fn list_transactions_filters_and_paginates() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    let bob = customer(&engine, "bob").await;

    let base = Utc::now();
    for (account, minutes, amount) in [(&alice, 0, 100), (&alice, 1, 200), (&alice, 2, 300)] {
        engine
            .request_deposit(DepositRequestCmd::new(
                account.id,
                amount,
                base + Duration::minutes(minutes),
            ))
            .await
            .unwrap();
    }
    engine
        .request_deposit(DepositRequestCmd::new(
            bob.id,
            999,
            base + Duration::minutes(3),
        ))
        .await
        .unwrap();

    let filter = TransactionListFilter {
        account_id: Some(alice.id),
        ..Default::default()
    };
    let (page, cursor) = engine
        .list_transactions_page(2, None, &filter)
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    // Newest first.
    assert_eq!(page[0].amount_minor, 300);
    assert_eq!(page[1].amount_minor, 200);

    let cursor = cursor.expect("a third row is left");
    let (rest, end) = engine
        .list_transactions_page(2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].amount_minor, 100);
    assert!(end.is_none());

    // Status filter sees only approved rows.
    let approved = engine
        .list_transactions(
            10,
            &TransactionListFilter {
                status: Some(TransactionStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(approved.is_empty());
}

#[tokio::test]
async fn shift_report_sums_the_current_window() {
    let (engine, _db) = engine_with_db().await;
    let alice = customer(&engine, "alice").await;
    let offset = FixedOffset::east_opt(0).unwrap();

    let now = Utc::now();
    let deposit_id = engine
        .request_deposit(DepositRequestCmd::new(alice.id, 700, now))
        .await
        .unwrap();
    engine.approve(deposit_id, None).await.unwrap();

    // Pending rows stay out of the report.
    engine
        .request_deposit(DepositRequestCmd::new(alice.id, 11, now))
        .await
        .unwrap();

    let report = engine.shift_report(now, offset).await.unwrap();
    assert_eq!(report.deposits_minor, 700);
    assert_eq!(report.withdrawals_minor, 0);
    assert!(report.starts_at <= now && now < report.ends_at);
}
