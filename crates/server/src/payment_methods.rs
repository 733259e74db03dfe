//! Payment method API endpoints

use api_types::payment_method::{
    PaymentMethodNew, PaymentMethodUpdate, PaymentMethodView, PaymentMethodsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, require_staff, server::ServerState};
use engine::{Account, NewPaymentMethodCmd, PaymentMethod};

fn map_method(method: PaymentMethod) -> PaymentMethodView {
    PaymentMethodView {
        id: method.id,
        name: method.name,
        instructions: method.instructions,
        active: method.active,
        min_amount_minor: method.min_amount_minor,
        icon_ref: method.icon_ref,
        payment_url: method.payment_url,
    }
}

/// Customers only see active methods; staff see everything.
pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<PaymentMethodsResponse>, ServerError> {
    let active_only = !account.role.is_staff();

    let payment_methods = state
        .engine
        .list_payment_methods(active_only)
        .await?
        .into_iter()
        .map(map_method)
        .collect();

    Ok(Json(PaymentMethodsResponse { payment_methods }))
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentMethodNew>,
) -> Result<(StatusCode, Json<PaymentMethodView>), ServerError> {
    require_staff(&account)?;

    let mut cmd = NewPaymentMethodCmd::new(
        payload.name,
        payload.instructions,
        payload.min_amount_minor,
    );
    cmd.icon_ref = payload.icon_ref;
    cmd.payment_url = payload.payment_url;

    let method = state.engine.create_payment_method(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_method(method))))
}

pub async fn update(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentMethodUpdate>,
) -> Result<Json<PaymentMethodView>, ServerError> {
    require_staff(&account)?;

    let method = state
        .engine
        .set_payment_method_active(id, payload.active)
        .await?;
    Ok(Json(map_method(method)))
}
