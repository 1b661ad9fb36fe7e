//! core_banking Library
//!
//! Re-exports modules for the server binary and integration tests.

pub mod api;
pub mod config;
pub mod conversion;
pub mod domain;
pub mod handlers;
pub mod seed;
pub mod state;
pub mod store;

mod error;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorResponse};
pub use domain::{Account, Amount, CurrencyCode, OperationContext, Transaction, TransferError};
pub use state::AppState;
