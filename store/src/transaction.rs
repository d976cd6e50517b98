//! Append-only transaction records.

use crate::StoreError;
use driplet_types::{Amount, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a disbursement attempt was for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    Claim,
    Lottery,
    ReferralBonus,
    NewUserBonus,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Claim => "claim",
            Purpose::Lottery => "lottery",
            Purpose::ReferralBonus => "referral_bonus",
            Purpose::NewUserBonus => "new_user_bonus",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one disbursement attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOutcome {
    Success,
    Failed,
}

/// One attempted disbursement, written only after the network outcome is
/// known. Immutable once appended.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub user: UserId,
    pub amount: Amount,
    pub purpose: Purpose,
    pub outcome: TxOutcome,
    /// Network transaction id, present on success.
    pub ledger_tx_id: Option<String>,
    pub recorded_at: Timestamp,
}

/// Trait for the append-only transaction log.
pub trait TransactionStore: Send + Sync {
    fn append(&self, record: TransactionRecord) -> Result<(), StoreError>;

    fn for_user(&self, id: UserId) -> Result<Vec<TransactionRecord>, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;
}
