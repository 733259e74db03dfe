//! Payment method primitives.
//!
//! Purely informational for the deposit flow: a method tells the customer
//! where to send money and what the minimum top-up is. Nothing here touches
//! balances.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
    pub instructions: String,
    pub active: bool,
    pub min_amount_minor: i64,
    pub icon_ref: Option<String>,
    pub payment_url: Option<String>,
}

impl PaymentMethod {
    pub fn new(name: String, instructions: String, min_amount_minor: i64) -> ResultEngine<Self> {
        if min_amount_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "min_amount_minor must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            instructions,
            active: true,
            min_amount_minor,
            icon_ref: None,
            payment_url: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub instructions: String,
    pub active: bool,
    pub min_amount_minor: i64,
    pub icon_ref: Option<String>,
    pub payment_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PaymentMethod> for ActiveModel {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: ActiveValue::Set(method.id.to_string()),
            name: ActiveValue::Set(method.name.clone()),
            instructions: ActiveValue::Set(method.instructions.clone()),
            active: ActiveValue::Set(method.active),
            min_amount_minor: ActiveValue::Set(method.min_amount_minor),
            icon_ref: ActiveValue::Set(method.icon_ref.clone()),
            payment_url: ActiveValue::Set(method.payment_url.clone()),
        }
    }
}

impl TryFrom<Model> for PaymentMethod {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("payment method not exists".to_string()))?,
            name: model.name,
            instructions: model.instructions,
            active: model.active,
            min_amount_minor: model.min_amount_minor,
            icon_ref: model.icon_ref,
            payment_url: model.payment_url,
        })
    }
}
