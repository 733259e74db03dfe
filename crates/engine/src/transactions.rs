//! Ledger transaction primitives.
//!
//! A `Transaction` is an append-only record of a balance-affecting event.
//! Rows are never rewritten except for the single pending → approved /
//! rejected transition and the staff `viewed` notification flag.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Purchase,
    RentCharge,
    Refund,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Purchase => "purchase",
            Self::RentCharge => "rent_charge",
            Self::Refund => "refund",
        }
    }

    /// Income kinds feed the staff notification badge.
    pub fn is_income(self) -> bool {
        matches!(self, Self::Purchase | Self::RentCharge)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "purchase" => Ok(Self::Purchase),
            "rent_charge" => Ok(Self::RentCharge),
            "refund" => Ok(Self::Refund),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Discriminates the two flavours of withdrawal-kind requests.
///
/// A plain withdrawal debits the account when the request is filed; a refund
/// request debits nothing and credits on approval instead. The source
/// encoded this in a description prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Withdrawal,
    RefundRequest,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::RefundRequest => "refund_request",
        }
    }
}

impl TryFrom<&str> for RequestKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "withdrawal" => Ok(Self::Withdrawal),
            "refund_request" => Ok(Self::RefundRequest),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid request kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// Only set on withdrawal-kind rows.
    pub request_kind: Option<RequestKind>,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub receipt_ref: Option<String>,
    /// Staff notification flag, meaningful on income rows.
    pub viewed: bool,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        status: TransactionStatus,
        amount_minor: i64,
        description: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            status,
            request_kind: None,
            amount_minor,
            description,
            receipt_ref: None,
            viewed: false,
            occurred_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub status: String,
    pub request_kind: Option<String>,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub receipt_ref: Option<String>,
    pub viewed: bool,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            request_kind: ActiveValue::Set(tx.request_kind.map(|k| k.as_str().to_string())),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            receipt_ref: ActiveValue::Set(tx.receipt_ref.clone()),
            viewed: ActiveValue::Set(tx.viewed),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let request_kind = match model.request_kind.as_deref() {
            Some(raw) => Some(RequestKind::try_from(raw)?),
            None => None,
        };
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            request_kind,
            amount_minor: model.amount_minor,
            description: model.description,
            receipt_ref: model.receipt_ref,
            viewed: model.viewed,
            occurred_at: model.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn rejects_non_positive_amount() {
        let err = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Deposit,
            TransactionStatus::Pending,
            0,
            None,
            Utc.timestamp_opt(0, 0).unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount_minor must be > 0".to_string())
        );
    }

    #[test]
    fn income_kinds() {
        assert!(TransactionKind::Purchase.is_income());
        assert!(TransactionKind::RentCharge.is_income());
        assert!(!TransactionKind::Deposit.is_income());
        assert!(!TransactionKind::Withdrawal.is_income());
        assert!(!TransactionKind::Refund.is_income());
    }

    #[test]
    fn kind_round_trip() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::Purchase,
            TransactionKind::RentCharge,
            TransactionKind::Refund,
        ] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }
}
