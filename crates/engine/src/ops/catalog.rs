//! Catalog operations: reservations, rent charges, cancellations and the
//! staff-side item lifecycle.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CatalogItem, EngineError, ItemStatus, NewItemCmd, RentChargeCmd, ReserveCmd, ResultEngine,
    Transaction, TransactionKind, TransactionStatus, UpdateItemCmd, items, transactions,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// Outcome of a successful reservation: the purchase row id and the unit the
/// buyer now holds (the template itself, or a freshly cloned unit).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub transaction_id: Uuid,
    pub item: CatalogItem,
}

/// Resolves the final price: the listed one, or the buyer's offer when the
/// listing is free-price.
fn resolve_price(listed_minor: i64, offered_minor: Option<i64>) -> ResultEngine<i64> {
    if listed_minor > 0 {
        return Ok(listed_minor);
    }
    match offered_minor {
        Some(offer) if offer > 0 => Ok(offer),
        _ => Err(EngineError::InvalidAmount(
            "free-price item requires an offered amount > 0".to_string(),
        )),
    }
}

impl Engine {
    /// Reserves an item for the account, debiting the final price.
    ///
    /// A single unit flips to reserved in place. A stock template (unlimited
    /// or multi-stock) stays available and a single-unit clone owned by the
    /// buyer is created instead, decrementing finite stock.
    pub async fn reserve(&self, cmd: ReserveCmd) -> ResultEngine<Reservation> {
        with_tx!(self, |db_tx| {
            let item_model = self.require_item(&db_tx, cmd.item_id).await?;
            let item = CatalogItem::try_from(item_model)?;
            if item.status != ItemStatus::Available {
                return Err(EngineError::ItemUnavailable(format!(
                    "item is {}",
                    item.status.as_str()
                )));
            }

            let price_minor = resolve_price(item.price_minor, cmd.offered_minor)?;
            let account = self.require_account(&db_tx, cmd.account_id).await?;
            self.apply_balance_delta(&db_tx, &account, -price_minor)
                .await?;

            let unit = if item.is_stock_template() {
                let mut unit = item.clone();
                unit.id = Uuid::new_v4();
                unit.quantity = 1;
                unit.status = ItemStatus::Reserved;
                unit.owner_id = Some(cmd.account_id);
                unit.reserved_at = Some(cmd.occurred_at);
                unit.last_paid_minor = price_minor;
                items::ActiveModel::from(&unit).insert(&db_tx).await?;

                // Unlimited templates (quantity 0) never run down.
                if item.quantity > 1 {
                    let template = items::ActiveModel {
                        id: ActiveValue::Set(item.id.to_string()),
                        quantity: ActiveValue::Set(item.quantity - 1),
                        ..Default::default()
                    };
                    template.update(&db_tx).await?;
                }
                unit
            } else {
                let mut unit = item;
                unit.status = ItemStatus::Reserved;
                unit.owner_id = Some(cmd.account_id);
                unit.reserved_at = Some(cmd.occurred_at);
                unit.last_paid_minor = price_minor;
                items::ActiveModel::from(&unit).update(&db_tx).await?;
                unit
            };

            let tx = Transaction::new(
                cmd.account_id,
                TransactionKind::Purchase,
                TransactionStatus::Approved,
                price_minor,
                Some(format!("purchase: {}", unit.title)),
                cmd.occurred_at,
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            Ok(Reservation {
                transaction_id: tx.id,
                item: unit,
            })
        })
    }

    /// Charges rent on a unit the account owns and accumulates the total
    /// paid on it. The unit's status does not change.
    pub async fn pay_rent(&self, cmd: RentChargeCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let item_model = self.require_item(&db_tx, cmd.item_id).await?;
            let item = CatalogItem::try_from(item_model)?;
            if item.owner_id != Some(cmd.account_id) {
                return Err(EngineError::NotOwner(
                    "item is not rented by this account".to_string(),
                ));
            }

            let price_minor = resolve_price(item.price_minor, cmd.offered_minor)?;
            let account = self.require_account(&db_tx, cmd.account_id).await?;
            self.apply_balance_delta(&db_tx, &account, -price_minor)
                .await?;

            let item_active = items::ActiveModel {
                id: ActiveValue::Set(item.id.to_string()),
                last_paid_minor: ActiveValue::Set(item.last_paid_minor + price_minor),
                ..Default::default()
            };
            item_active.update(&db_tx).await?;

            let tx = Transaction::new(
                cmd.account_id,
                TransactionKind::RentCharge,
                TransactionStatus::Approved,
                price_minor,
                Some(format!("rent: {}", item.title)),
                cmd.occurred_at,
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx.id)
        })
    }

    /// Releases a unit back to the catalog, clearing owner and reservation
    /// timestamp.
    ///
    /// No funds move: the purchase row stays approved and the buyer is not
    /// refunded. Staff wanting to return the money pair this with
    /// [`Engine::process_refund`].
    pub async fn cancel_reservation(&self, item_id: Uuid) -> ResultEngine<CatalogItem> {
        with_tx!(self, |db_tx| {
            let item_model = self.require_item(&db_tx, item_id).await?;
            let mut item = CatalogItem::try_from(item_model)?;

            item.status = ItemStatus::Available;
            item.owner_id = None;
            item.reserved_at = None;
            items::ActiveModel::from(&item).update(&db_tx).await?;
            Ok(item)
        })
    }

    pub async fn create_item(&self, cmd: NewItemCmd) -> ResultEngine<CatalogItem> {
        let title = normalize_required_text(&cmd.title, "title")?;
        let mut item = CatalogItem::new(title, cmd.price_minor, cmd.quantity)?;
        item.description = normalize_optional_text(cmd.description.as_deref());
        item.image_ref = normalize_optional_text(cmd.image_ref.as_deref());

        items::ActiveModel::from(&item)
            .insert(&self.database)
            .await?;
        Ok(item)
    }

    /// Updates listing fields. Ownership and reservation state are not
    /// touchable from here; use the reservation calls for those.
    pub async fn update_item(&self, item_id: Uuid, cmd: UpdateItemCmd) -> ResultEngine<CatalogItem> {
        with_tx!(self, |db_tx| {
            let item_model = self.require_item(&db_tx, item_id).await?;
            let mut item = CatalogItem::try_from(item_model)?;

            if let Some(title) = cmd.title.as_deref() {
                item.title = normalize_required_text(title, "title")?;
            }
            if cmd.description.is_some() {
                item.description = normalize_optional_text(cmd.description.as_deref());
            }
            if cmd.image_ref.is_some() {
                item.image_ref = normalize_optional_text(cmd.image_ref.as_deref());
            }
            if let Some(price_minor) = cmd.price_minor {
                if price_minor < 0 {
                    return Err(EngineError::InvalidAmount(
                        "price_minor must be >= 0".to_string(),
                    ));
                }
                item.price_minor = price_minor;
            }
            if let Some(quantity) = cmd.quantity {
                if quantity < 0 {
                    return Err(EngineError::InvalidAmount(
                        "quantity must be >= 0".to_string(),
                    ));
                }
                item.quantity = quantity;
            }
            if let Some(unavailable) = cmd.unavailable {
                item.status = match (unavailable, item.status) {
                    (true, ItemStatus::Available) => ItemStatus::Unavailable,
                    (false, ItemStatus::Unavailable) => ItemStatus::Available,
                    (_, status) => status,
                };
            }

            items::ActiveModel::from(&item).update(&db_tx).await?;
            Ok(item)
        })
    }

    /// Deletes an item that nobody holds. Reserved and sold units stay put
    /// so the owner's record survives.
    pub async fn delete_item(&self, item_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let item_model = self.require_item(&db_tx, item_id).await?;
            let item = CatalogItem::try_from(item_model)?;
            if matches!(item.status, ItemStatus::Reserved | ItemStatus::Sold) {
                return Err(EngineError::ItemUnavailable(format!(
                    "cannot delete a {} item",
                    item.status.as_str()
                )));
            }

            items::Entity::delete_by_id(item.id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn item(&self, item_id: Uuid) -> ResultEngine<CatalogItem> {
        let model = items::Entity::find_by_id(item_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
        CatalogItem::try_from(model)
    }

    pub async fn list_items(&self, available_only: bool) -> ResultEngine<Vec<CatalogItem>> {
        let mut query = items::Entity::find().order_by_asc(items::Column::Title);
        if available_only {
            query = query.filter(items::Column::Status.eq(ItemStatus::Available.as_str()));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(CatalogItem::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_price_wins_over_offer() {
        assert_eq!(resolve_price(500, Some(100)).unwrap(), 500);
    }

    #[test]
    fn free_price_takes_the_offer() {
        assert_eq!(resolve_price(0, Some(2500)).unwrap(), 2500);
    }

    #[test]
    fn free_price_requires_positive_offer() {
        assert!(resolve_price(0, None).is_err());
        assert!(resolve_price(0, Some(0)).is_err());
        assert!(resolve_price(0, Some(-5)).is_err());
    }
}
