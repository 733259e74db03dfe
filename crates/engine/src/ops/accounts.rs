//! Account lifecycle: self-registration, credential checks, staff listing,
//! manager-only deletion.

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Account, EngineError, ItemStatus, RegisterAccountCmd, ResultEngine, Role, accounts, items,
    util::{normalize_login, normalize_required_text, password_digest, password_matches},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a customer account. Staff accounts are created the same way
    /// with an explicit role by the bootstrap tooling.
    pub async fn register_account(&self, cmd: RegisterAccountCmd) -> ResultEngine<Account> {
        self.register_account_with_role(cmd, Role::User).await
    }

    pub async fn register_account_with_role(
        &self,
        cmd: RegisterAccountCmd,
        role: Role,
    ) -> ResultEngine<Account> {
        let display_name = normalize_required_text(&cmd.display_name, "display name")?;
        let login = normalize_login(&cmd.login)?;
        if cmd.password.is_empty() {
            return Err(EngineError::InvalidAmount(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::Login.eq(login.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(login));
            }

            let account = Account::new(
                display_name,
                login,
                password_digest(&cmd.password),
                role,
                cmd.created_at,
            );
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Resolves a login/password pair to an account.
    ///
    /// Both unknown logins and wrong passwords fail the same way, so the
    /// caller cannot probe for registered logins.
    pub async fn authenticate(&self, login: &str, password: &str) -> ResultEngine<Account> {
        let login = normalize_login(login)?;
        let model = accounts::Entity::find()
            .filter(accounts::Column::Login.eq(login))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::Forbidden("invalid credentials".to_string()))?;

        if !password_matches(password, &model.password_hash) {
            return Err(EngineError::Forbidden("invalid credentials".to_string()));
        }
        Account::try_from(model)
    }

    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    pub async fn list_accounts(&self) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?;

        models.into_iter().map(Account::try_from).collect()
    }

    /// Deletes an account. Managers only, and only while the balance is zero
    /// so no credit silently disappears.
    pub async fn delete_account(&self, actor: &Account, account_id: Uuid) -> ResultEngine<()> {
        if actor.role != Role::Manager {
            return Err(EngineError::Forbidden(
                "only a manager can delete accounts".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            if model.balance_minor != 0 {
                return Err(EngineError::InvalidAmount(
                    "balance must be zero before deletion".to_string(),
                ));
            }

            // Units the account still holds go back to the catalog, so no
            // row is left reserved without an owner.
            items::Entity::update_many()
                .col_expr(
                    items::Column::Status,
                    Expr::value(ItemStatus::Available.as_str()),
                )
                .col_expr(items::Column::OwnerId, Expr::value(Option::<String>::None))
                .col_expr(
                    items::Column::ReservedAt,
                    Expr::value(Option::<chrono::DateTime<chrono::Utc>>::None),
                )
                .filter(items::Column::OwnerId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;

            accounts::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
