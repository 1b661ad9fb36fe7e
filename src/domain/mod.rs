//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod amount;
pub mod context;
pub mod currency;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountError};
pub use amount::{parse_exact_decimal, Amount, AmountError};
pub use context::OperationContext;
pub use currency::{CurrencyCode, CurrencyError};
pub use error::{TransferError, TransferErrorKind};
pub use transaction::{Transaction, TransactionError, TransactionStatus};
