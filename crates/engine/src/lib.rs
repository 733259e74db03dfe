pub use accounts::{Account, Role};
pub use commands::{
    DepositRequestCmd, DirectRefundCmd, NewItemCmd, NewPaymentMethodCmd, RefundRequestCmd,
    RegisterAccountCmd, RentChargeCmd, ReserveCmd, UpdateItemCmd, WithdrawalRequestCmd,
};
pub use error::EngineError;
pub use items::{CatalogItem, ItemStatus};
pub use ops::{Engine, EngineBuilder, Reservation, ShiftReport, TransactionListFilter};
pub use payment_methods::PaymentMethod;
pub use transactions::{RequestKind, Transaction, TransactionKind, TransactionStatus};
pub use util::{SHIFT_ANCHOR_HOUR, shift_window};

pub mod accounts;
mod commands;
mod error;
pub mod items;
mod ops;
pub mod payment_methods;
pub mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
