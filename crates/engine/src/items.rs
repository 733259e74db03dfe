//! Catalog item primitives.
//!
//! `quantity` encodes the stock mode: `0` is unlimited, `1` a single unit,
//! anything greater a finite multi-stock template. Reserving a template
//! clones a single-unit row for the buyer; reserving a single unit flips the
//! row itself. `owner_id` is set exactly when the status is reserved or sold.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    Reserved,
    Sold,
    Unavailable,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
            Self::Unavailable => "unavailable",
        }
    }
}

impl TryFrom<&str> for ItemStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "sold" => Ok(Self::Sold),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid item status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    /// Listed price in credit minor units. `0` means the buyer names the
    /// price at reservation time.
    pub price_minor: i64,
    /// `0` = unlimited stock, `1` = single unit, `> 1` = finite multi-stock.
    pub quantity: i32,
    pub status: ItemStatus,
    pub owner_id: Option<Uuid>,
    pub reserved_at: Option<DateTime<Utc>>,
    /// Running total of what the current owner has paid on this unit.
    pub last_paid_minor: i64,
}

impl CatalogItem {
    pub fn new(title: String, price_minor: i64, quantity: i32) -> ResultEngine<Self> {
        if price_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "price_minor must be >= 0".to_string(),
            ));
        }
        if quantity < 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description: None,
            image_ref: None,
            price_minor,
            quantity,
            status: ItemStatus::Available,
            owner_id: None,
            reserved_at: None,
            last_paid_minor: 0,
        })
    }

    /// True when reserving must clone a fresh single-unit row instead of
    /// flipping this one.
    pub fn is_stock_template(&self) -> bool {
        self.quantity == 0 || self.quantity > 1
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub price_minor: i64,
    pub quantity: i32,
    pub status: String,
    pub owner_id: Option<String>,
    pub reserved_at: Option<DateTimeUtc>,
    pub last_paid_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::OwnerId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Owner,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CatalogItem> for ActiveModel {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            title: ActiveValue::Set(item.title.clone()),
            description: ActiveValue::Set(item.description.clone()),
            image_ref: ActiveValue::Set(item.image_ref.clone()),
            price_minor: ActiveValue::Set(item.price_minor),
            quantity: ActiveValue::Set(item.quantity),
            status: ActiveValue::Set(item.status.as_str().to_string()),
            owner_id: ActiveValue::Set(item.owner_id.map(|id| id.to_string())),
            reserved_at: ActiveValue::Set(item.reserved_at),
            last_paid_minor: ActiveValue::Set(item.last_paid_minor),
        }
    }
}

impl TryFrom<Model> for CatalogItem {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let owner_id = match model.owner_id {
            Some(raw) => Some(
                Uuid::parse_str(&raw)
                    .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("item not exists".to_string()))?,
            title: model.title,
            description: model.description,
            image_ref: model.image_ref,
            price_minor: model.price_minor,
            quantity: model.quantity,
            status: ItemStatus::try_from(model.status.as_str())?,
            owner_id,
            reserved_at: model.reserved_at,
            last_paid_minor: model.last_paid_minor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_modes() {
        let unlimited = CatalogItem::new("Locker".to_string(), 500, 0).unwrap();
        let single = CatalogItem::new("Desk".to_string(), 500, 1).unwrap();
        let multi = CatalogItem::new("Chair".to_string(), 500, 3).unwrap();

        assert!(unlimited.is_stock_template());
        assert!(!single.is_stock_template());
        assert!(multi.is_stock_template());
    }

    #[test]
    fn rejects_negative_price() {
        assert_eq!(
            CatalogItem::new("Desk".to_string(), -1, 1),
            Err(EngineError::InvalidAmount(
                "price_minor must be >= 0".to_string()
            ))
        );
    }

    #[test]
    fn status_round_trip() {
        for status in [
            ItemStatus::Available,
            ItemStatus::Reserved,
            ItemStatus::Sold,
            ItemStatus::Unavailable,
        ] {
            assert_eq!(ItemStatus::try_from(status.as_str()).unwrap(), status);
        }
    }
}
