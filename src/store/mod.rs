//! Store module
//!
//! In-memory storage for accounts and transactions. Nothing here survives a
//! restart.

mod accounts;
mod error;
mod ledger;

pub use accounts::{lock_pair, AccountRef, AccountRegistry};
pub use error::StoreError;
pub use ledger::TransactionLedger;
