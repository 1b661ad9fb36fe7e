//! Account entity
//!
//! A balance-holding record denominated in a single currency. Only the
//! balance changes after creation, and only through `debit`/`credit`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::currency::{self, CurrencyCode, CurrencyError};

/// Errors that can occur when opening an account
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("Account balance cannot be negative (got {0})")]
    NegativeBalance(Decimal),

    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    id: Uuid,
    balance: Decimal,
    currency: CurrencyCode,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Open an account with an opening balance.
    pub fn open(id: Uuid, balance: Decimal, currency: &str) -> Result<Self, AccountError> {
        Self::open_at(id, balance, currency, Utc::now())
    }

    pub fn open_at(
        id: Uuid,
        balance: Decimal,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AccountError> {
        if balance < Decimal::ZERO {
            return Err(AccountError::NegativeBalance(balance));
        }

        Ok(Self {
            id,
            balance,
            currency: currency::normalize(currency)?,
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check if the balance covers `amount`
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Subtract `amount` from the balance.
    ///
    /// Returns `None` and leaves the balance untouched if the result would be
    /// negative.
    pub(crate) fn debit(&mut self, amount: Decimal) -> Option<Decimal> {
        let new_balance = self.balance.checked_sub(amount)?;
        if new_balance < Decimal::ZERO {
            return None;
        }
        self.balance = new_balance;
        Some(new_balance)
    }

    /// Add `amount` to the balance. Returns `None` on decimal overflow.
    pub(crate) fn credit(&mut self, amount: Decimal) -> Option<Decimal> {
        let new_balance = self.balance.checked_add(amount)?;
        self.balance = new_balance;
        Some(new_balance)
    }

    /// Restore a balance captured before a failed operation.
    pub(crate) fn restore_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}
