use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod accounts;
mod items;
mod payment_methods;
mod reports;
mod server;
mod transactions;

pub mod types {
    pub mod account {
        pub use api_types::account::{AccountNew, AccountView, AccountsResponse, Role};
    }

    pub mod item {
        pub use api_types::item::{
            ItemList, ItemNew, ItemStatus, ItemUpdate, ItemView, ItemsResponse, RentCharge,
            ReservationCreated, Reserve,
        };
    }

    pub mod payment_method {
        pub use api_types::payment_method::{
            PaymentMethodNew, PaymentMethodUpdate, PaymentMethodView, PaymentMethodsResponse,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            Approve, DepositNew, DirectRefundNew, PendingRequestsResponse, RefundRequestNew,
            TransactionCreated, TransactionList, TransactionListResponse, TransactionView,
            UnviewedIncomeResponse, WithdrawalNew,
        };
    }

    pub mod report {
        pub use api_types::report::{ShiftQuery, ShiftReportView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::ItemUnavailable(_)
        | EngineError::NotOwner(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Guard for routes reserved to staff (admins and managers).
fn require_staff(account: &engine::Account) -> Result<(), ServerError> {
    if !account.role.is_staff() {
        return Err(ServerError::Engine(EngineError::Forbidden(
            "staff only".to_string(),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Role;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InsufficientFunds("x".to_string()),
            EngineError::ItemUnavailable("x".to_string()),
            EngineError::NotOwner("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn staff_guard() {
        let mut account = engine::Account::new(
            "Mario".to_string(),
            "mario".to_string(),
            String::new(),
            Role::User,
            chrono::Utc::now(),
        );
        assert!(require_staff(&account).is_err());

        account.role = Role::Admin;
        assert!(require_staff(&account).is_ok());
    }
}
