//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Outcome of a failed transfer.
///
/// The five client-caused kinds carry the exact message reported to the
/// caller. `Unexpected` covers internal faults and must never be reported as
/// a client error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Amount is zero or negative
    #[error("{0}")]
    InvalidAmount(String),

    /// Currency is not a known ISO 4217 code
    #[error("{0}")]
    InvalidCurrency(String),

    /// Source or target account does not exist
    #[error("{0}")]
    AccountNotFound(String),

    /// Source and target are the same account
    #[error("{0}")]
    SameAccount(String),

    /// Source balance does not cover the converted amount
    #[error("{0}")]
    InsufficientBalance(String),

    /// Internal fault (lock poisoning, ledger inconsistency, overflow)
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Discriminant of `TransferError`, used by the transport layer to pick a
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferErrorKind {
    InvalidAmount,
    InvalidCurrency,
    AccountNotFound,
    SameAccount,
    InsufficientBalance,
    Unexpected,
}

impl TransferError {
    pub fn invalid_amount(amount: impl std::fmt::Display) -> Self {
        Self::InvalidAmount(format!("Transaction amount ({}) is invalid", amount))
    }

    pub fn invalid_currency(code: impl std::fmt::Display) -> Self {
        Self::InvalidCurrency(format!("Transaction currency ({}) is invalid", code))
    }

    pub fn source_not_found() -> Self {
        Self::AccountNotFound("source account not found".to_string())
    }

    pub fn target_not_found() -> Self {
        Self::AccountNotFound("target account not found".to_string())
    }

    pub fn same_account() -> Self {
        Self::SameAccount("source and target accounts are same".to_string())
    }

    pub fn insufficient_balance() -> Self {
        Self::InsufficientBalance("insufficient balance in source account".to_string())
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::Unexpected(reason.into())
    }

    pub fn kind(&self) -> TransferErrorKind {
        match self {
            Self::InvalidAmount(_) => TransferErrorKind::InvalidAmount,
            Self::InvalidCurrency(_) => TransferErrorKind::InvalidCurrency,
            Self::AccountNotFound(_) => TransferErrorKind::AccountNotFound,
            Self::SameAccount(_) => TransferErrorKind::SameAccount,
            Self::InsufficientBalance(_) => TransferErrorKind::InsufficientBalance,
            Self::Unexpected(_) => TransferErrorKind::Unexpected,
        }
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Unexpected(_))
    }
}
