//! Account primitives.
//!
//! An `Account` is a balance-holding identity: a customer or a member of
//! staff. Balances are plain credit minor units and must never go negative;
//! the ops layer rejects any mutation that would.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Manager => "manager",
        }
    }

    /// Staff can review requests and manage the catalog.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            other => Err(EngineError::InvalidAmount(format!("invalid role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub display_name: String,
    /// Login handle, unique per account. The source accepted either a phone
    /// number or a free-form login here; we keep it a single opaque field.
    pub login: String,
    pub password_hash: String,
    pub balance_minor: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        display_name: String,
        login: String,
        password_hash: String,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name,
            login,
            password_hash,
            balance_minor: 0,
            role,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub display_name: String,
    pub login: String,
    pub password_hash: String,
    pub balance_minor: i64,
    pub role: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            display_name: ActiveValue::Set(account.display_name.clone()),
            login: ActiveValue::Set(account.login.clone()),
            password_hash: ActiveValue::Set(account.password_hash.clone()),
            balance_minor: ActiveValue::Set(account.balance_minor),
            role: ActiveValue::Set(account.role.as_str().to_string()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            display_name: model.display_name,
            login: model.login,
            password_hash: model.password_hash,
            balance_minor: model.balance_minor,
            role: Role::try_from(model.role.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn staff_roles() {
        assert!(!Role::User.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(Role::Manager.is_staff());
    }

    #[test]
    fn role_round_trip() {
        for role in [Role::User, Role::Admin, Role::Manager] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
        assert!(Role::try_from("root").is_err());
    }

    #[test]
    fn rejects_malformed_row() {
        let model = Model {
            id: "not-a-uuid".to_string(),
            display_name: "Mario".to_string(),
            login: "mario".to_string(),
            password_hash: String::new(),
            balance_minor: 0,
            role: "user".to_string(),
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        };
        assert!(Account::try_from(model).is_err());
    }
}
