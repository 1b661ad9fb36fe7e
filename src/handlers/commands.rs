//! Command definitions
//!
//! Commands represent intentions to change the system state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Command to move `amount` of `currency` between two accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub source_account_id: Uuid,
    pub target_account_id: Uuid,
    pub amount: Decimal,
    /// Currency code as supplied by the caller, not yet normalized
    pub currency: String,
}

impl TransferCommand {
    pub fn new(
        source_account_id: Uuid,
        target_account_id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            source_account_id,
            target_account_id,
            amount,
            currency: currency.into(),
        }
    }
}

/// Result of a successful transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub transaction_id: Uuid,
    pub source_account_id: Uuid,
    pub target_account_id: Uuid,
    /// Amount taken from the source, in the source account's currency
    pub debited: Decimal,
    /// Amount added to the target, in the target account's currency
    pub credited: Decimal,
}
