//! Transaction Ledger
//!
//! Append-only store of transaction records. Records are never removed; the
//! only mutation is the single `Fail -> Success` status transition.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::Transaction;

use super::StoreError;

#[derive(Debug, Default)]
pub struct TransactionLedger {
    transactions: DashMap<Uuid, Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Fails if the id is already present.
    pub fn insert(&self, transaction: Transaction) -> Result<(), StoreError> {
        let id = transaction.id();
        match self.transactions.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateTransaction(id)),
            Entry::Vacant(slot) => {
                slot.insert(transaction);
                Ok(())
            }
        }
    }

    /// All records, in no particular order.
    pub fn find_all(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Transaction> {
        self.transactions.get(&id).map(|entry| entry.value().clone())
    }

    /// Mark a record successful. Unknown ids and repeated calls are errors.
    pub fn mark_success(&self, id: Uuid) -> Result<(), StoreError> {
        let mut entry = self
            .transactions
            .get_mut(&id)
            .ok_or(StoreError::UnknownTransaction(id))?;
        entry.value_mut().mark_success()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
