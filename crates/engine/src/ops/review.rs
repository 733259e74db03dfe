//! Staff review of pending requests, plus the income notification badge and
//! the shift report.
//!
//! `approve` and `reject` are guarded by `status == pending`: a repeated
//! call on the same id is a silent no-op, never a double credit. That guard
//! is what makes blind client retries safe.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    DirectRefundCmd, EngineError, RequestKind, ResultEngine, Transaction, TransactionKind,
    TransactionStatus, transactions,
    util::{normalize_optional_text, shift_window},
};

use super::{Engine, with_tx};

/// Reporting bucket totals for one 24-hour staff shift.
///
/// Only approved rows count. Window bounds are `[starts_at, ends_at)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub deposits_minor: i64,
    pub withdrawals_minor: i64,
    pub purchases_minor: i64,
    pub rent_charges_minor: i64,
    pub refunds_minor: i64,
}

impl Engine {
    /// Approves a pending request.
    ///
    /// If the row is not pending anymore the call is a no-op and returns the
    /// row as it is. `manual_amount_minor` overwrites the requested amount
    /// before any credit, letting staff correct a mistyped deposit.
    pub async fn approve(
        &self,
        transaction_id: Uuid,
        manual_amount_minor: Option<i64>,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let tx = Transaction::try_from(model)?;
            if tx.status != TransactionStatus::Pending {
                return Ok(tx);
            }

            let amount_minor = match manual_amount_minor {
                Some(amount) if amount <= 0 => {
                    return Err(EngineError::InvalidAmount(
                        "manual amount must be > 0".to_string(),
                    ));
                }
                Some(amount) => amount,
                None => tx.amount_minor,
            };

            let description = match (tx.kind, tx.request_kind) {
                (TransactionKind::Deposit, _) => {
                    let account = self.require_account(&db_tx, tx.account_id).await?;
                    self.apply_balance_delta(&db_tx, &account, amount_minor)
                        .await?;
                    "deposit confirmed"
                }
                (TransactionKind::Withdrawal, Some(RequestKind::RefundRequest)) => {
                    let account = self.require_account(&db_tx, tx.account_id).await?;
                    self.apply_balance_delta(&db_tx, &account, amount_minor)
                        .await?;
                    "refund completed"
                }
                // Plain withdrawals were debited at request time.
                (TransactionKind::Withdrawal, _) => "withdrawal confirmed, funds deducted",
                (kind, _) => {
                    return Err(EngineError::InvalidAmount(format!(
                        "cannot approve a {} row",
                        kind.as_str()
                    )));
                }
            };

            let tx_active = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id.to_string()),
                status: ActiveValue::Set(TransactionStatus::Approved.as_str().to_string()),
                amount_minor: ActiveValue::Set(amount_minor),
                description: ActiveValue::Set(Some(description.to_string())),
                ..Default::default()
            };
            let updated = tx_active.update(&db_tx).await?;
            Transaction::try_from(updated)
        })
    }

    /// Rejects a pending request.
    ///
    /// A plain withdrawal gets its optimistic debit credited back; deposits
    /// and refund requests never moved any funds, so only the status flips.
    /// Not-pending rows are returned unchanged.
    pub async fn reject(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let tx = Transaction::try_from(model)?;
            if tx.status != TransactionStatus::Pending {
                return Ok(tx);
            }

            if tx.kind == TransactionKind::Withdrawal
                && tx.request_kind != Some(RequestKind::RefundRequest)
            {
                let account = self.require_account(&db_tx, tx.account_id).await?;
                self.apply_balance_delta(&db_tx, &account, tx.amount_minor)
                    .await?;
            }

            let tx_active = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id.to_string()),
                status: ActiveValue::Set(TransactionStatus::Rejected.as_str().to_string()),
                ..Default::default()
            };
            let updated = tx_active.update(&db_tx).await?;
            Transaction::try_from(updated)
        })
    }

    /// Credits an account on the spot with an already-approved refund row.
    ///
    /// Staff use this outside the request flow, e.g. to compensate for a
    /// cancelled order.
    pub async fn process_refund(&self, cmd: DirectRefundCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, cmd.account_id).await?;

            let tx = Transaction::new(
                cmd.account_id,
                TransactionKind::Refund,
                TransactionStatus::Approved,
                cmd.amount_minor,
                normalize_optional_text(Some(cmd.reason.as_str())),
                cmd.occurred_at,
            )?;

            self.apply_balance_delta(&db_tx, &account, cmd.amount_minor)
                .await?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx.id)
        })
    }

    /// Requests waiting for staff: pending rows that are not synchronous
    /// charges (purchases and rent charges are born approved).
    pub async fn pending_requests(&self) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .filter(transactions::Column::Kind.is_not_in([
                TransactionKind::Purchase.as_str(),
                TransactionKind::RentCharge.as_str(),
            ]))
            .order_by_asc(transactions::Column::OccurredAt)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Income rows (purchases, rent charges) staff have not looked at yet.
    pub async fn unviewed_income_count(&self) -> ResultEngine<u64> {
        transactions::Entity::find()
            .filter(transactions::Column::Kind.is_in([
                TransactionKind::Purchase.as_str(),
                TransactionKind::RentCharge.as_str(),
            ]))
            .filter(transactions::Column::Viewed.eq(false))
            .count(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Clears the income notification badge. Returns how many rows flipped.
    pub async fn mark_income_viewed(&self) -> ResultEngine<u64> {
        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::Viewed, Expr::value(true))
            .filter(transactions::Column::Kind.is_in([
                TransactionKind::Purchase.as_str(),
                TransactionKind::RentCharge.as_str(),
            ]))
            .filter(transactions::Column::Viewed.eq(false))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    /// Sums the approved rows of the shift containing `now`.
    pub async fn shift_report(
        &self,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> ResultEngine<ShiftReport> {
        let (starts_at, ends_at) = shift_window(now, offset)?;

        let models = transactions::Entity::find()
            .filter(transactions::Column::Status.eq(TransactionStatus::Approved.as_str()))
            .filter(transactions::Column::OccurredAt.gte(starts_at))
            .filter(transactions::Column::OccurredAt.lt(ends_at))
            .all(&self.database)
            .await?;

        let mut report = ShiftReport {
            starts_at,
            ends_at,
            deposits_minor: 0,
            withdrawals_minor: 0,
            purchases_minor: 0,
            rent_charges_minor: 0,
            refunds_minor: 0,
        };
        for model in models {
            let tx = Transaction::try_from(model)?;
            match tx.kind {
                TransactionKind::Deposit => report.deposits_minor += tx.amount_minor,
                TransactionKind::Withdrawal => report.withdrawals_minor += tx.amount_minor,
                TransactionKind::Purchase => report.purchases_minor += tx.amount_minor,
                TransactionKind::RentCharge => report.rent_charges_minor += tx.amount_minor,
                TransactionKind::Refund => report.refunds_minor += tx.amount_minor,
            }
        }
        Ok(report)
    }
}
