//! Command structs for engine operations.
//!
//! These types group parameters for write operations (requests, staff
//! refunds, reservations, rent charges), keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// File a deposit top-up request.
#[derive(Clone, Debug)]
pub struct DepositRequestCmd {
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub receipt_ref: Option<String>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl DepositRequestCmd {
    #[must_use]
    pub fn new(account_id: Uuid, amount_minor: i64, occurred_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            amount_minor,
            receipt_ref: None,
            description: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn receipt_ref(mut self, receipt_ref: impl Into<String>) -> Self {
        self.receipt_ref = Some(receipt_ref.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// File a withdrawal request. The account is debited up front.
#[derive(Clone, Debug)]
pub struct WithdrawalRequestCmd {
    pub account_id: Uuid,
    pub amount_minor: i64,
    /// Where the money should go (card number, bank details).
    pub destination: String,
    pub occurred_at: DateTime<Utc>,
}

impl WithdrawalRequestCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        amount_minor: i64,
        destination: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            amount_minor,
            destination: destination.into(),
            occurred_at,
        }
    }
}

/// File a refund request for staff review. Nothing is debited.
#[derive(Clone, Debug)]
pub struct RefundRequestCmd {
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

impl RefundRequestCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        amount_minor: i64,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            amount_minor,
            reason: reason.into(),
            occurred_at,
        }
    }
}

/// Staff-initiated refund, credited immediately without a request row.
#[derive(Clone, Debug)]
pub struct DirectRefundCmd {
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

impl DirectRefundCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        amount_minor: i64,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            amount_minor,
            reason: reason.into(),
            occurred_at,
        }
    }
}

/// Reserve a catalog item, paying its price (or naming one).
#[derive(Clone, Debug)]
pub struct ReserveCmd {
    pub account_id: Uuid,
    pub item_id: Uuid,
    /// Required when the item's listed price is 0 ("buyer names the price").
    pub offered_minor: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

impl ReserveCmd {
    #[must_use]
    pub fn new(account_id: Uuid, item_id: Uuid, occurred_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            item_id,
            offered_minor: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn offered_minor(mut self, offered_minor: i64) -> Self {
        self.offered_minor = Some(offered_minor);
        self
    }
}

/// Charge rent on an item the account already owns.
#[derive(Clone, Debug)]
pub struct RentChargeCmd {
    pub account_id: Uuid,
    pub item_id: Uuid,
    /// Required when the item's listed price is 0.
    pub offered_minor: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

impl RentChargeCmd {
    #[must_use]
    pub fn new(account_id: Uuid, item_id: Uuid, occurred_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            item_id,
            offered_minor: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn offered_minor(mut self, offered_minor: i64) -> Self {
        self.offered_minor = Some(offered_minor);
        self
    }
}

/// Self-registration of a customer account.
#[derive(Clone, Debug)]
pub struct RegisterAccountCmd {
    pub display_name: String,
    pub login: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl RegisterAccountCmd {
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            login: login.into(),
            password: password.into(),
            created_at,
        }
    }
}

/// Create a catalog item (staff).
#[derive(Clone, Debug)]
pub struct NewItemCmd {
    pub title: String,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub price_minor: i64,
    pub quantity: i32,
}

impl NewItemCmd {
    #[must_use]
    pub fn new(title: impl Into<String>, price_minor: i64, quantity: i32) -> Self {
        Self {
            title: title.into(),
            description: None,
            image_ref: None,
            price_minor,
            quantity,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// Update a catalog item's listing fields (staff). `None` leaves a field
/// untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateItemCmd {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub price_minor: Option<i64>,
    pub quantity: Option<i32>,
    pub unavailable: Option<bool>,
}

/// Create a payment method (staff).
#[derive(Clone, Debug)]
pub struct NewPaymentMethodCmd {
    pub name: String,
    pub instructions: String,
    pub min_amount_minor: i64,
    pub icon_ref: Option<String>,
    pub payment_url: Option<String>,
}

impl NewPaymentMethodCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        min_amount_minor: i64,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            min_amount_minor,
            icon_ref: None,
            payment_url: None,
        }
    }

    #[must_use]
    pub fn icon_ref(mut self, icon_ref: impl Into<String>) -> Self {
        self.icon_ref = Some(icon_ref.into());
        self
    }

    #[must_use]
    pub fn payment_url(mut self, payment_url: impl Into<String>) -> Self {
        self.payment_url = Some(payment_url.into());
        self
    }
}
