use sea_orm::{ActiveValue, DatabaseConnection, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod accounts;
mod catalog;
mod list;
mod payment_methods;
mod requests;
mod review;

pub use catalog::Reservation;
pub use list::TransactionListFilter;
pub use review::ShiftReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<crate::accounts::Model> {
        crate::accounts::Entity::find_by_id(account_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(super) async fn require_item(
        &self,
        db_tx: &DatabaseTransaction,
        item_id: Uuid,
    ) -> ResultEngine<crate::items::Model> {
        crate::items::Entity::find_by_id(item_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))
    }

    pub(super) async fn require_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<crate::transactions::Model> {
        crate::transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    /// Applies a signed delta to an account balance, rejecting any result
    /// below zero, and persists the new balance. Must run inside the same DB
    /// transaction as the ledger insert relying on it.
    pub(super) async fn apply_balance_delta(
        &self,
        db_tx: &DatabaseTransaction,
        account: &crate::accounts::Model,
        delta_minor: i64,
    ) -> ResultEngine<i64> {
        let new_balance = account.balance_minor + delta_minor;
        if new_balance < 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "balance is {}, requested {}",
                account.balance_minor, -delta_minor
            )));
        }

        let account_model = crate::accounts::ActiveModel {
            id: ActiveValue::Set(account.id.clone()),
            balance_minor: ActiveValue::Set(new_balance),
            ..Default::default()
        };
        account_model.update(db_tx).await?;
        Ok(new_balance)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
