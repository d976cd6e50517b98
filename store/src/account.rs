//! Account record and storage trait.

use crate::StoreError;
use driplet_types::{Amount, LedgerAddress, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Durable per-user faucet record.
///
/// Created on first contact, mutated by cooldown advances and successful
/// disbursements, never deleted. `referrer` is fixed at creation and is
/// never the account's own id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    /// Set once the user completes the wallet sign-in handshake.
    pub authorized: bool,
    /// Destination for this user's payouts; `None` until authorized.
    pub address: Option<LedgerAddress>,
    pub last_claim: Option<Timestamp>,
    pub last_lottery: Option<Timestamp>,
    pub claim_count: u64,
    pub total_profit: Amount,
    pub referrer: Option<UserId>,
    pub referral_profit: Amount,
    pub subscribed: bool,
    pub created_at: Timestamp,
}

impl Account {
    /// Fresh account as created on first contact.
    pub fn new(user_id: UserId, referrer: Option<UserId>, now: Timestamp) -> Self {
        Self {
            user_id,
            authorized: false,
            address: None,
            last_claim: None,
            last_lottery: None,
            claim_count: 0,
            total_profit: Amount::ZERO,
            referrer,
            referral_profit: Amount::ZERO,
            subscribed: false,
            created_at: now,
        }
    }
}

/// Trait for account storage operations.
pub trait AccountStore: Send + Sync {
    fn exists(&self, id: UserId) -> Result<bool, StoreError>;

    /// Create a fresh account. Fails on a duplicate id or a self-referral.
    fn create(&self, id: UserId, referrer: Option<UserId>, now: Timestamp)
        -> Result<(), StoreError>;

    fn get(&self, id: UserId) -> Result<Option<Account>, StoreError>;

    /// Record the signed-in ledger address and mark the account authorized.
    fn set_address(&self, id: UserId, address: LedgerAddress) -> Result<(), StoreError>;

    /// Advance the claim cooldown, bump the claim counter, add profit.
    fn record_claim(&self, id: UserId, amount: Amount, now: Timestamp) -> Result<(), StoreError>;

    /// Advance the lottery cooldown and add profit.
    fn record_lottery(&self, id: UserId, amount: Amount, now: Timestamp) -> Result<(), StoreError>;

    /// Credit a settled referral bonus (counts toward total profit too).
    fn add_referral_profit(&self, id: UserId, amount: Amount) -> Result<(), StoreError>;

    fn set_subscribed(&self, id: UserId, subscribed: bool) -> Result<(), StoreError>;

    /// How many accounts name this user as their referrer.
    fn count_referrals(&self, id: UserId) -> Result<u64, StoreError>;
}
