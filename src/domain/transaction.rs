//! Transaction entity
//!
//! One record per transfer attempt. Everything except `status` is fixed at
//! construction; `status` moves from `Fail` to `Success` at most once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::amount::Amount;
use super::currency::{self, CurrencyCode};
use super::error::TransferError;

/// Transaction status
///
/// A record is `Fail` until the transfer it describes has committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Fail,
    Success,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Fail => "FAIL",
            TransactionStatus::Success => "SUCCESS",
        }
    }
}

/// Errors raised by invalid status transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction {0} is already marked successful")]
    AlreadySettled(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    id: Uuid,
    source_account_id: Uuid,
    target_account_id: Uuid,
    amount: Amount,
    currency: CurrencyCode,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a candidate transaction with a fresh id and the current time.
    ///
    /// The amount is validated before the currency, so a request that is
    /// wrong on both counts reports `InvalidAmount`.
    pub fn new(
        source_account_id: Uuid,
        target_account_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<Self, TransferError> {
        Self::from_parts(
            Uuid::new_v4(),
            source_account_id,
            target_account_id,
            amount,
            currency,
            Utc::now(),
        )
    }

    pub fn from_parts(
        id: Uuid,
        source_account_id: Uuid,
        target_account_id: Uuid,
        amount: Decimal,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TransferError> {
        let amount = Amount::new(amount).map_err(|_| TransferError::invalid_amount(amount))?;
        let currency =
            currency::normalize(currency).map_err(|_| TransferError::invalid_currency(currency))?;

        Ok(Self {
            id,
            source_account_id,
            target_account_id,
            amount,
            currency,
            status: TransactionStatus::default(),
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_account_id(&self) -> Uuid {
        self.source_account_id
    }

    pub fn target_account_id(&self) -> Uuid {
        self.target_account_id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_successful(&self) -> bool {
        self.status == TransactionStatus::Success
    }

    /// Move the record to `Success`. Fails if it is already there.
    pub(crate) fn mark_success(&mut self) -> Result<(), TransactionError> {
        if self.is_successful() {
            return Err(TransactionError::AlreadySettled(self.id));
        }
        self.status = TransactionStatus::Success;
        Ok(())
    }
}
