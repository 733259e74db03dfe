//! Ledger API endpoints: requests, staff review and listings.

use api_types::transaction::{
    Approve, DepositNew, DirectRefundNew, PendingRequestsResponse, RefundRequestNew,
    RequestKind as ApiRequestKind, TransactionCreated, TransactionKind as ApiKind,
    TransactionList, TransactionListResponse, TransactionStatus as ApiStatus, TransactionView,
    UnviewedIncomeResponse, WithdrawalNew,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, require_staff, server::ServerState};
use engine::{
    Account, DepositRequestCmd, DirectRefundCmd, RefundRequestCmd, Transaction,
    TransactionListFilter, WithdrawalRequestCmd,
};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Deposit => ApiKind::Deposit,
        engine::TransactionKind::Withdrawal => ApiKind::Withdrawal,
        engine::TransactionKind::Purchase => ApiKind::Purchase,
        engine::TransactionKind::RentCharge => ApiKind::RentCharge,
        engine::TransactionKind::Refund => ApiKind::Refund,
    }
}

fn unmap_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Deposit => engine::TransactionKind::Deposit,
        ApiKind::Withdrawal => engine::TransactionKind::Withdrawal,
        ApiKind::Purchase => engine::TransactionKind::Purchase,
        ApiKind::RentCharge => engine::TransactionKind::RentCharge,
        ApiKind::Refund => engine::TransactionKind::Refund,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Approved => ApiStatus::Approved,
        engine::TransactionStatus::Rejected => ApiStatus::Rejected,
    }
}

fn unmap_status(status: ApiStatus) -> engine::TransactionStatus {
    match status {
        ApiStatus::Pending => engine::TransactionStatus::Pending,
        ApiStatus::Approved => engine::TransactionStatus::Approved,
        ApiStatus::Rejected => engine::TransactionStatus::Rejected,
    }
}

fn map_request_kind(kind: engine::RequestKind) -> ApiRequestKind {
    match kind {
        engine::RequestKind::Withdrawal => ApiRequestKind::Withdrawal,
        engine::RequestKind::RefundRequest => ApiRequestKind::RefundRequest,
    }
}

fn map_transaction(tx: Transaction) -> Result<TransactionView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    Ok(TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        kind: map_kind(tx.kind),
        status: map_status(tx.status),
        request_kind: tx.request_kind.map(map_request_kind),
        amount_minor: tx.amount_minor,
        description: tx.description,
        receipt_ref: tx.receipt_ref,
        viewed: tx.viewed,
        occurred_at: tx.occurred_at.with_timezone(&utc),
    })
}

pub async fn deposit_new(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<DepositNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = DepositRequestCmd::new(account.id, payload.amount_minor, Utc::now());
    cmd.receipt_ref = payload.receipt_ref;
    cmd.description = payload.description;

    let id = state.engine.request_deposit(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn withdrawal_new(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<WithdrawalNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let id = state
        .engine
        .request_withdrawal(WithdrawalRequestCmd::new(
            account.id,
            payload.amount_minor,
            payload.destination,
            Utc::now(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn refund_request_new(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<RefundRequestNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let id = state
        .engine
        .request_refund(RefundRequestCmd::new(
            account.id,
            payload.amount_minor,
            payload.reason,
            Utc::now(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn direct_refund(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<DirectRefundNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    require_staff(&account)?;

    let id = state
        .engine
        .process_refund(DirectRefundCmd::new(
            payload.account_id,
            payload.amount_minor,
            payload.reason,
            Utc::now(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn approve(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Approve>,
) -> Result<Json<TransactionView>, ServerError> {
    require_staff(&account)?;

    let tx = state
        .engine
        .approve(id, payload.manual_amount_minor)
        .await?;
    Ok(Json(map_transaction(tx)?))
}

pub async fn reject(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    require_staff(&account)?;

    let tx = state.engine.reject(id).await?;
    Ok(Json(map_transaction(tx)?))
}

pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Option<Json<TransactionList>>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or(TransactionList {
        account_id: None,
        kinds: None,
        status: None,
        from: None,
        to: None,
        limit: None,
        cursor: None,
    });

    // Customers only see their own ledger; staff can ask for anyone's.
    let account_id = if account.role.is_staff() {
        payload.account_id
    } else {
        Some(account.id)
    };

    let filter = TransactionListFilter {
        account_id,
        kinds: payload
            .kinds
            .map(|kinds| kinds.into_iter().map(unmap_kind).collect()),
        status: payload.status.map(unmap_status),
        from: payload.from.map(|dt| dt.with_timezone(&Utc)),
        to: payload.to.map(|dt| dt.with_timezone(&Utc)),
    };

    let limit = payload.limit.unwrap_or(50);
    let (txs, next_cursor) = state
        .engine
        .list_transactions_page(limit, payload.cursor.as_deref(), &filter)
        .await?;

    let transactions = txs
        .into_iter()
        .map(map_transaction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(TransactionListResponse {
        transactions,
        next_cursor,
    }))
}

pub async fn pending(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<PendingRequestsResponse>, ServerError> {
    require_staff(&account)?;

    let requests = state
        .engine
        .pending_requests()
        .await?
        .into_iter()
        .map(map_transaction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(PendingRequestsResponse { requests }))
}

pub async fn unviewed_income(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<UnviewedIncomeResponse>, ServerError> {
    require_staff(&account)?;

    let count = state.engine.unviewed_income_count().await?;
    Ok(Json(UnviewedIncomeResponse { count }))
}

pub async fn mark_income_viewed(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    require_staff(&account)?;

    state.engine.mark_income_viewed().await?;
    Ok(StatusCode::OK)
}
