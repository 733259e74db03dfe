//! Catalog API endpoints

use api_types::item::{
    ItemList, ItemNew, ItemStatus as ApiItemStatus, ItemUpdate, ItemView, ItemsResponse,
    RentCharge, ReservationCreated, Reserve,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, require_staff, server::ServerState};
use engine::{Account, CatalogItem, NewItemCmd, RentChargeCmd, ReserveCmd, UpdateItemCmd};

fn map_status(status: engine::ItemStatus) -> ApiItemStatus {
    match status {
        engine::ItemStatus::Available => ApiItemStatus::Available,
        engine::ItemStatus::Reserved => ApiItemStatus::Reserved,
        engine::ItemStatus::Sold => ApiItemStatus::Sold,
        engine::ItemStatus::Unavailable => ApiItemStatus::Unavailable,
    }
}

fn map_item(item: CatalogItem) -> Result<ItemView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    Ok(ItemView {
        id: item.id,
        title: item.title,
        description: item.description,
        image_ref: item.image_ref,
        price_minor: item.price_minor,
        quantity: item.quantity,
        status: map_status(item.status),
        owner_id: item.owner_id,
        reserved_at: item.reserved_at.map(|at| at.with_timezone(&utc)),
        last_paid_minor: item.last_paid_minor,
    })
}

pub async fn list(
    Extension(_account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Option<Json<ItemList>>,
) -> Result<Json<ItemsResponse>, ServerError> {
    let available_only = payload
        .as_ref()
        .and_then(|Json(list)| list.available_only)
        .unwrap_or(false);

    let items = state
        .engine
        .list_items(available_only)
        .await?
        .into_iter()
        .map(map_item)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ItemsResponse { items }))
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    require_staff(&account)?;

    let mut cmd = NewItemCmd::new(payload.title, payload.price_minor, payload.quantity);
    cmd.description = payload.description;
    cmd.image_ref = payload.image_ref;

    let item = state.engine.create_item(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_item(item)?)))
}

pub async fn update(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    require_staff(&account)?;

    let item = state
        .engine
        .update_item(
            id,
            UpdateItemCmd {
                title: payload.title,
                description: payload.description,
                image_ref: payload.image_ref,
                price_minor: payload.price_minor,
                quantity: payload.quantity,
                unavailable: payload.unavailable,
            },
        )
        .await?;

    Ok(Json(map_item(item)?))
}

pub async fn delete(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_staff(&account)?;

    state.engine.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reserve(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Reserve>,
) -> Result<(StatusCode, Json<ReservationCreated>), ServerError> {
    let mut cmd = ReserveCmd::new(account.id, id, Utc::now());
    if let Some(offered_minor) = payload.offered_minor {
        cmd = cmd.offered_minor(offered_minor);
    }

    let reservation = state.engine.reserve(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReservationCreated {
            transaction_id: reservation.transaction_id,
            item: map_item(reservation.item)?,
        }),
    ))
}

pub async fn rent(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RentCharge>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = RentChargeCmd::new(account.id, id, Utc::now());
    if let Some(offered_minor) = payload.offered_minor {
        cmd = cmd.offered_minor(offered_minor);
    }

    state.engine.pay_rent(cmd).await?;
    Ok(StatusCode::CREATED)
}

pub async fn cancel(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemView>, ServerError> {
    require_staff(&account)?;

    let item = state.engine.cancel_reservation(id).await?;
    Ok(Json(map_item(item)?))
}
