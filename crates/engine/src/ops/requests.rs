//! Customer-side request entry points: deposit top-ups, withdrawals and
//! refund requests.
//!
//! Each entry point runs as one DB transaction, so the balance column and
//! the ledger row always commit together. The withdrawal pre-debit in
//! particular can never survive a failed ledger insert.

use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DepositRequestCmd, RefundRequestCmd, RequestKind, ResultEngine, Transaction, TransactionKind,
    TransactionStatus, WithdrawalRequestCmd, transactions, util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Files a deposit request with the uploaded receipt reference.
    ///
    /// No balance change happens here; the credit lands when staff approve.
    pub async fn request_deposit(&self, cmd: DepositRequestCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, cmd.account_id).await?;

            let mut tx = Transaction::new(
                cmd.account_id,
                TransactionKind::Deposit,
                TransactionStatus::Pending,
                cmd.amount_minor,
                normalize_optional_text(cmd.description.as_deref()),
                cmd.occurred_at,
            )?;
            tx.receipt_ref = normalize_optional_text(cmd.receipt_ref.as_deref());

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx.id)
        })
    }

    /// Files a withdrawal request, debiting the account immediately.
    ///
    /// The optimistic debit reserves the funds while staff review the
    /// request; [`Engine::reject`] credits them back.
    pub async fn request_withdrawal(&self, cmd: WithdrawalRequestCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, cmd.account_id).await?;

            let mut tx = Transaction::new(
                cmd.account_id,
                TransactionKind::Withdrawal,
                TransactionStatus::Pending,
                cmd.amount_minor,
                normalize_optional_text(Some(cmd.destination.as_str())),
                cmd.occurred_at,
            )?;
            tx.request_kind = Some(RequestKind::Withdrawal);

            self.apply_balance_delta(&db_tx, &account, -cmd.amount_minor)
                .await?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx.id)
        })
    }

    /// Files a refund request for staff review.
    ///
    /// Unlike a withdrawal nothing is debited; approval credits the account
    /// instead.
    pub async fn request_refund(&self, cmd: RefundRequestCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, cmd.account_id).await?;

            let mut tx = Transaction::new(
                cmd.account_id,
                TransactionKind::Withdrawal,
                TransactionStatus::Pending,
                cmd.amount_minor,
                normalize_optional_text(Some(cmd.reason.as_str())),
                cmd.occurred_at,
            )?;
            tx.request_kind = Some(RequestKind::RefundRequest);

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx.id)
        })
    }
}
