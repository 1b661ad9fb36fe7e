//! Shared application state
//!
//! Owns the stores and the transfer handler for the life of the process.

use std::sync::Arc;

use crate::conversion::{CurrencyConverter, PassThroughConverter};
use crate::handlers::TransferHandler;
use crate::seed::{self, SeedError};
use crate::store::{AccountRegistry, TransactionLedger};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountRegistry>,
    pub ledger: Arc<TransactionLedger>,
    pub transfers: Arc<TransferHandler>,
}

impl AppState {
    pub fn new(
        accounts: AccountRegistry,
        ledger: TransactionLedger,
        converter: Arc<dyn CurrencyConverter>,
    ) -> Self {
        let accounts = Arc::new(accounts);
        let ledger = Arc::new(ledger);
        let transfers = Arc::new(TransferHandler::new(
            accounts.clone(),
            ledger.clone(),
            converter,
        ));

        Self {
            accounts,
            ledger,
            transfers,
        }
    }

    /// Seed accounts, an empty ledger and pass-through conversion.
    pub fn seeded() -> Result<Self, SeedError> {
        Ok(Self::new(
            seed::seed_registry()?,
            TransactionLedger::new(),
            Arc::new(PassThroughConverter),
        ))
    }
}
