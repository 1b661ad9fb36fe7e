//! Seed data
//!
//! The fixed account set provisioned at startup. General account
//! provisioning is not offered.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Account, AccountError};
use crate::store::{AccountRegistry, StoreError};

pub const SOURCE_ACCOUNT_ID: Uuid = Uuid::from_u128(0x2a91ddbe_8d9a_4029_8192_400ac0ca066d);
pub const TARGET_ACCOUNT_ID: Uuid = Uuid::from_u128(0x0ff18d2e_db78_4555_8352_fbea3a2004d1);

const SEED_CURRENCY: &str = "GBP";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The two starting accounts: 100 GBP and 200 GBP.
pub fn seed_accounts() -> Result<Vec<Account>, AccountError> {
    Ok(vec![
        Account::open(SOURCE_ACCOUNT_ID, Decimal::from(100), SEED_CURRENCY)?,
        Account::open(TARGET_ACCOUNT_ID, Decimal::from(200), SEED_CURRENCY)?,
    ])
}

/// Registry holding the seed accounts.
pub fn seed_registry() -> Result<AccountRegistry, SeedError> {
    let accounts = seed_accounts()?;
    for account in &accounts {
        tracing::info!(
            account_id = %account.id(),
            balance = %account.balance(),
            currency = %account.currency(),
            "seeded account"
        );
    }
    Ok(AccountRegistry::with_accounts(accounts)?)
}
