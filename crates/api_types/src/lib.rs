use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        User,
        Admin,
        Manager,
    }

    /// Self-registration request body.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub display_name: String,
        pub login: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub display_name: String,
        pub login: String,
        pub balance_minor: i64,
        pub role: Role,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod item {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ItemStatus {
        Available,
        Reserved,
        Sold,
        Unavailable,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub title: String,
        pub description: Option<String>,
        pub image_ref: Option<String>,
        pub price_minor: i64,
        /// `0` = unlimited stock, `1` = single unit, `> 1` = multi-stock.
        pub quantity: i32,
    }

    /// Partial update; absent fields stay unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub title: Option<String>,
        pub description: Option<String>,
        pub image_ref: Option<String>,
        pub price_minor: Option<i64>,
        pub quantity: Option<i32>,
        pub unavailable: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub image_ref: Option<String>,
        pub price_minor: i64,
        pub quantity: i32,
        pub status: ItemStatus,
        pub owner_id: Option<Uuid>,
        pub reserved_at: Option<DateTime<FixedOffset>>,
        pub last_paid_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemsResponse {
        pub items: Vec<ItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemList {
        /// Restrict the listing to reservable items.
        pub available_only: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Reserve {
        /// Required when the item's listed price is 0.
        pub offered_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RentCharge {
        pub offered_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReservationCreated {
        pub transaction_id: Uuid,
        pub item: ItemView,
    }
}

pub mod payment_method {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentMethodNew {
        pub name: String,
        pub instructions: String,
        pub min_amount_minor: i64,
        pub icon_ref: Option<String>,
        pub payment_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentMethodUpdate {
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentMethodView {
        pub id: Uuid,
        pub name: String,
        pub instructions: String,
        pub active: bool,
        pub min_amount_minor: i64,
        pub icon_ref: Option<String>,
        pub payment_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentMethodsResponse {
        pub payment_methods: Vec<PaymentMethodView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Deposit,
        Withdrawal,
        Purchase,
        RentCharge,
        Refund,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Approved,
        Rejected,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RequestKind {
        Withdrawal,
        RefundRequest,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        pub amount_minor: i64,
        pub receipt_ref: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalNew {
        pub amount_minor: i64,
        /// Card number, bank details or similar.
        pub destination: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RefundRequestNew {
        pub amount_minor: i64,
        pub reason: String,
    }

    /// Staff-initiated refund, credited immediately.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DirectRefundNew {
        pub account_id: Uuid,
        pub amount_minor: i64,
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Approve {
        /// Overrides the requested amount before crediting.
        pub manual_amount_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub request_kind: Option<RequestKind>,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub receipt_ref: Option<String>,
        pub viewed: bool,
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account_id: Option<Uuid>,
        pub kinds: Option<Vec<TransactionKind>>,
        pub status: Option<TransactionStatus>,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingRequestsResponse {
        pub requests: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnviewedIncomeResponse {
        pub count: u64,
    }
}

pub mod report {
    use super::*;

    /// One 24-hour staff shift, bounds `[starts_at, ends_at)`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShiftReportView {
        pub starts_at: DateTime<FixedOffset>,
        pub ends_at: DateTime<FixedOffset>,
        pub deposits_minor: i64,
        pub withdrawals_minor: i64,
        pub purchases_minor: i64,
        pub rent_charges_minor: i64,
        pub refunds_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShiftQuery {
        /// Local UTC offset in whole seconds, defaults to UTC.
        pub utc_offset_seconds: Option<i32>,
    }
}
