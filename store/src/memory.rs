//! In-memory reference store.
//!
//! Thread-safe for use with tokio's multi-threaded runtime. Suitable for a
//! single-instance deployment and for tests; a durable backend implements
//! the same traits.

use crate::account::{Account, AccountStore};
use crate::transaction::{TransactionRecord, TransactionStore};
use crate::StoreError;
use driplet_types::{Amount, LedgerAddress, Timestamp, UserId};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct MemoryStore {
    accounts: Mutex<HashMap<UserId, Account>>,
    transactions: Mutex<Vec<TransactionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            transactions: Mutex::new(Vec::new()),
        }
    }

    fn with_account<T>(
        &self,
        id: UserId,
        f: impl FnOnce(&mut Account) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(account)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for MemoryStore {
    fn exists(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains_key(&id))
    }

    fn create(
        &self,
        id: UserId,
        referrer: Option<UserId>,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        if referrer == Some(id) {
            return Err(StoreError::Invalid(format!("user {id} cannot refer itself")));
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        accounts.insert(id, Account::new(id, referrer, now));
        Ok(())
    }

    fn get(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    fn set_address(&self, id: UserId, address: LedgerAddress) -> Result<(), StoreError> {
        self.with_account(id, |account| {
            account.address = Some(address);
            account.authorized = true;
            Ok(())
        })
    }

    fn record_claim(&self, id: UserId, amount: Amount, now: Timestamp) -> Result<(), StoreError> {
        self.with_account(id, |account| {
            account.last_claim = Some(now);
            account.claim_count += 1;
            account.total_profit = account.total_profit.saturating_add(amount);
            Ok(())
        })
    }

    fn record_lottery(&self, id: UserId, amount: Amount, now: Timestamp) -> Result<(), StoreError> {
        self.with_account(id, |account| {
            account.last_lottery = Some(now);
            account.total_profit = account.total_profit.saturating_add(amount);
            Ok(())
        })
    }

    fn add_referral_profit(&self, id: UserId, amount: Amount) -> Result<(), StoreError> {
        self.with_account(id, |account| {
            account.referral_profit = account.referral_profit.saturating_add(amount);
            account.total_profit = account.total_profit.saturating_add(amount);
            Ok(())
        })
    }

    fn set_subscribed(&self, id: UserId, subscribed: bool) -> Result<(), StoreError> {
        self.with_account(id, |account| {
            account.subscribed = subscribed;
            Ok(())
        })
    }

    fn count_referrals(&self, id: UserId) -> Result<u64, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.referrer == Some(id))
            .count() as u64)
    }
}

impl TransactionStore for MemoryStore {
    fn append(&self, record: TransactionRecord) -> Result<(), StoreError> {
        self.transactions.lock().unwrap().push(record);
        Ok(())
    }

    fn for_user(&self, id: UserId) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user == id)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.transactions.lock().unwrap().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Purpose, TxOutcome};

    fn test_address() -> LedgerAddress {
        LedgerAddress::parse("rDsEH84xWaJycg341gzfx2ZMW7KrnBsVsy").unwrap()
    }

    #[test]
    fn create_then_get() {
        let store = MemoryStore::new();
        let id = UserId::new(1);
        store.create(id, None, Timestamp::new(1000)).unwrap();
        assert!(store.exists(id).unwrap());

        let account = store.get(id).unwrap().unwrap();
        assert!(!account.authorized);
        assert!(account.address.is_none());
        assert_eq!(account.claim_count, 0);
        assert_eq!(account.created_at, Timestamp::new(1000));
    }

    #[test]
    fn duplicate_create_rejected() {
        let store = MemoryStore::new();
        let id = UserId::new(1);
        store.create(id, None, Timestamp::EPOCH).unwrap();
        assert!(matches!(
            store.create(id, None, Timestamp::EPOCH),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn self_referral_rejected() {
        let store = MemoryStore::new();
        let id = UserId::new(7);
        assert!(matches!(
            store.create(id, Some(id), Timestamp::EPOCH),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn set_address_authorizes() {
        let store = MemoryStore::new();
        let id = UserId::new(1);
        store.create(id, None, Timestamp::EPOCH).unwrap();
        store.set_address(id, test_address()).unwrap();

        let account = store.get(id).unwrap().unwrap();
        assert!(account.authorized);
        assert_eq!(account.address, Some(test_address()));
    }

    #[test]
    fn record_claim_advances_cooldown_and_counters() {
        let store = MemoryStore::new();
        let id = UserId::new(1);
        store.create(id, None, Timestamp::EPOCH).unwrap();

        store
            .record_claim(id, Amount::from_drops(100), Timestamp::new(5000))
            .unwrap();

        let account = store.get(id).unwrap().unwrap();
        assert_eq!(account.last_claim, Some(Timestamp::new(5000)));
        assert_eq!(account.claim_count, 1);
        assert_eq!(account.total_profit, Amount::from_drops(100));
        assert!(account.last_lottery.is_none());
    }

    #[test]
    fn record_lottery_is_independent_of_claims() {
        let store = MemoryStore::new();
        let id = UserId::new(1);
        store.create(id, None, Timestamp::EPOCH).unwrap();

        store
            .record_lottery(id, Amount::from_drops(500), Timestamp::new(7000))
            .unwrap();

        let account = store.get(id).unwrap().unwrap();
        assert_eq!(account.last_lottery, Some(Timestamp::new(7000)));
        assert!(account.last_claim.is_none());
        assert_eq!(account.claim_count, 0);
        assert_eq!(account.total_profit, Amount::from_drops(500));
    }

    #[test]
    fn referral_profit_counts_toward_total() {
        let store = MemoryStore::new();
        let id = UserId::new(1);
        store.create(id, None, Timestamp::EPOCH).unwrap();

        store.add_referral_profit(id, Amount::from_drops(10)).unwrap();

        let account = store.get(id).unwrap().unwrap();
        assert_eq!(account.referral_profit, Amount::from_drops(10));
        assert_eq!(account.total_profit, Amount::from_drops(10));
    }

    #[test]
    fn count_referrals_walks_linkage() {
        let store = MemoryStore::new();
        let referrer = UserId::new(1);
        store.create(referrer, None, Timestamp::EPOCH).unwrap();
        for i in 2..=4 {
            store
                .create(UserId::new(i), Some(referrer), Timestamp::EPOCH)
                .unwrap();
        }
        store.create(UserId::new(5), None, Timestamp::EPOCH).unwrap();

        assert_eq!(store.count_referrals(referrer).unwrap(), 3);
        assert_eq!(store.count_referrals(UserId::new(5)).unwrap(), 0);
    }

    #[test]
    fn transactions_append_and_filter() {
        let store = MemoryStore::new();
        let a = UserId::new(1);
        let b = UserId::new(2);
        for (user, outcome) in [(a, TxOutcome::Success), (b, TxOutcome::Failed), (a, TxOutcome::Failed)] {
            store
                .append(TransactionRecord {
                    user,
                    amount: Amount::from_drops(100),
                    purpose: Purpose::Claim,
                    outcome,
                    ledger_tx_id: None,
                    recorded_at: Timestamp::EPOCH,
                })
                .unwrap();
        }

        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(store.for_user(a).unwrap().len(), 2);
        assert_eq!(store.for_user(b).unwrap().len(), 1);
    }

    #[test]
    fn missing_account_operations_error() {
        let store = MemoryStore::new();
        let id = UserId::new(99);
        assert!(store.get(id).unwrap().is_none());
        assert!(matches!(
            store.record_claim(id, Amount::ZERO, Timestamp::EPOCH),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.set_subscribed(id, true),
            Err(StoreError::NotFound(_))
        ));
    }
}
