//! Account API endpoints

use api_types::account::{AccountNew, AccountView, AccountsResponse, Role as ApiRole};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, require_staff, server::ServerState};
use engine::{Account, RegisterAccountCmd};

fn map_role(role: engine::Role) -> ApiRole {
    match role {
        engine::Role::User => ApiRole::User,
        engine::Role::Admin => ApiRole::Admin,
        engine::Role::Manager => ApiRole::Manager,
    }
}

pub(crate) fn map_account(account: Account) -> Result<AccountView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    Ok(AccountView {
        id: account.id,
        display_name: account.display_name,
        login: account.login,
        balance_minor: account.balance_minor,
        role: map_role(account.role),
        created_at: account.created_at.with_timezone(&utc),
    })
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .register_account(RegisterAccountCmd::new(
            payload.display_name,
            payload.login,
            payload.password,
            Utc::now(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(map_account(account)?)))
}

pub async fn me(Extension(account): Extension<Account>) -> Result<Json<AccountView>, ServerError> {
    Ok(Json(map_account(account)?))
}

pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<AccountsResponse>, ServerError> {
    require_staff(&account)?;

    let accounts = state
        .engine
        .list_accounts()
        .await?
        .into_iter()
        .map(map_account)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(AccountsResponse { accounts }))
}

pub async fn delete(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    // The engine enforces the manager-only and zero-balance rules.
    state.engine.delete_account(&account, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
