//! Store Errors
//!
//! Error types for registry and ledger operations. All of these signal a
//! broken internal invariant rather than a bad request.

use uuid::Uuid;

use crate::domain::TransactionError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Account id already registered
    #[error("Account already exists: {0}")]
    DuplicateAccount(Uuid),

    /// Transaction id already present in the ledger
    #[error("Transaction already exists: {0}")]
    DuplicateTransaction(Uuid),

    /// Transaction id not present in the ledger
    #[error("Transaction not found: {0}")]
    UnknownTransaction(Uuid),

    /// Invalid status transition
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// A thread panicked while holding an account lock
    #[error("Account lock poisoned: {0}")]
    Poisoned(Uuid),
}

impl From<StoreError> for crate::domain::TransferError {
    fn from(err: StoreError) -> Self {
        crate::domain::TransferError::unexpected(err.to_string())
    }
}
