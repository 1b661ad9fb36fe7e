//! Account Registry
//!
//! In-memory account records keyed by id. Each account sits behind its own
//! mutex, so transfers over disjoint accounts never contend while transfers
//! sharing an account are serialized on it.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{Account, CurrencyCode};

use super::StoreError;

/// Shared handle to one registered account.
#[derive(Debug, Clone)]
pub struct AccountRef {
    id: Uuid,
    currency: CurrencyCode,
    inner: Arc<Mutex<Account>>,
}

impl AccountRef {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fixed when the account is opened, so readable without the lock.
    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Lock the account for reading or mutation.
    pub fn lock(&self) -> Result<MutexGuard<'_, Account>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned(self.id))
    }

    fn is_same(&self, other: &AccountRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Lock two distinct accounts, always in ascending id order.
///
/// Guards are returned in argument order. Callers must reject
/// `first.id() == second.id()` beforehand.
pub fn lock_pair<'a>(
    first: &'a AccountRef,
    second: &'a AccountRef,
) -> Result<(MutexGuard<'a, Account>, MutexGuard<'a, Account>), StoreError> {
    debug_assert!(!first.is_same(second), "lock_pair called with one account twice");

    if first.id <= second.id {
        let a = first.lock()?;
        let b = second.lock()?;
        Ok((a, b))
    } else {
        let b = second.lock()?;
        let a = first.lock()?;
        Ok((a, b))
    }
}

#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: DashMap<Uuid, AccountRef>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a fixed set of accounts.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Result<Self, StoreError> {
        let registry = Self::new();
        for account in accounts {
            registry.insert(account)?;
        }
        Ok(registry)
    }

    /// Register an account. Fails if the id is taken.
    pub fn insert(&self, account: Account) -> Result<(), StoreError> {
        let id = account.id();
        match self.accounts.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateAccount(id)),
            Entry::Vacant(slot) => {
                slot.insert(AccountRef {
                    id,
                    currency: account.currency(),
                    inner: Arc::new(Mutex::new(account)),
                });
                Ok(())
            }
        }
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<AccountRef> {
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }

    /// Point-in-time copy of an account.
    pub fn snapshot(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        match self.find_by_id(id) {
            Some(account) => Ok(Some(account.lock()?.clone())),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(balance: rust_decimal::Decimal) -> Account {
        Account::open(Uuid::new_v4(), balance, "GBP").unwrap()
    }

    #[test]
    fn test_find_by_id() {
        let a = account(dec!(100));
        let id = a.id();
        let registry = AccountRegistry::with_accounts([a]).unwrap();

        let found = registry.find_by_id(id).unwrap();
        assert_eq!(found.id(), id);
        assert_eq!(found.lock().unwrap().balance(), dec!(100));
        assert!(registry.find_by_id(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let a = account(dec!(1));
        let registry = AccountRegistry::new();

        registry.insert(a.clone()).unwrap();
        assert_eq!(registry.insert(a.clone()), Err(StoreError::DuplicateAccount(a.id())));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mutation_through_handle_is_visible() {
        let a = account(dec!(100));
        let id = a.id();
        let registry = AccountRegistry::with_accounts([a]).unwrap();

        registry.find_by_id(id).unwrap().lock().unwrap().debit(dec!(40));

        assert_eq!(registry.snapshot(id).unwrap().unwrap().balance(), dec!(60));
    }

    #[test]
    fn test_lock_pair_returns_guards_in_argument_order() {
        let a = account(dec!(1));
        let b = account(dec!(2));
        let (a_id, b_id) = (a.id(), b.id());
        let registry = AccountRegistry::with_accounts([a, b]).unwrap();

        let first = registry.find_by_id(a_id).unwrap();
        let second = registry.find_by_id(b_id).unwrap();

        {
            let (x, y) = lock_pair(&first, &second).unwrap();
            assert_eq!(x.id(), a_id);
            assert_eq!(y.id(), b_id);
        }
        let (x, y) = lock_pair(&second, &first).unwrap();
        assert_eq!(x.id(), b_id);
        assert_eq!(y.id(), a_id);
    }

    #[test]
    fn test_opposite_order_locking_does_not_deadlock() {
        let a = account(dec!(1000));
        let b = account(dec!(1000));
        let (a_id, b_id) = (a.id(), b.id());
        let registry = AccountRegistry::with_accounts([a, b]).unwrap();

        std::thread::scope(|s| {
            for i in 0..8 {
                let registry = &registry;
                s.spawn(move || {
                    let (x, y) = if i % 2 == 0 { (a_id, b_id) } else { (b_id, a_id) };
                    let x = registry.find_by_id(x).unwrap();
                    let y = registry.find_by_id(y).unwrap();
                    for _ in 0..200 {
                        let (mut from, mut to) = lock_pair(&x, &y).unwrap();
                        from.debit(dec!(1)).unwrap();
                        to.credit(dec!(1)).unwrap();
                    }
                });
            }
        });

        let total = registry.snapshot(a_id).unwrap().unwrap().balance()
            + registry.snapshot(b_id).unwrap().unwrap().balance();
        assert_eq!(total, dec!(2000));
    }
}
