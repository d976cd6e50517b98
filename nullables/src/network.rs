//! Payment network double.

use driplet_ledger::{LedgerError, PaymentNetwork, SubmitOutcome};
use driplet_types::{Amount, LedgerAddress};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// One payment the double was asked to submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentPayment {
    pub source: LedgerAddress,
    pub destination: LedgerAddress,
    pub amount: Amount,
}

/// A [`PaymentNetwork`] that records submissions instead of sending them.
///
/// By default every submission confirms with a generated tx id. Outcomes can
/// be scripted per call with [`NullNetwork::enqueue_outcome`]; once the
/// script is exhausted the default resumes.
pub struct NullNetwork {
    scripted: Mutex<VecDeque<SubmitOutcome>>,
    sent: Mutex<Vec<SentPayment>>,
    next_tx: AtomicU64,
    active_accounts: Mutex<Option<Vec<LedgerAddress>>>,
}

impl NullNetwork {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            next_tx: AtomicU64::new(1),
            active_accounts: Mutex::new(None),
        }
    }

    pub fn enqueue_outcome(&self, outcome: SubmitOutcome) {
        self.scripted.lock().unwrap().push_back(outcome);
    }

    /// Restrict which accounts count as active. Without this every account
    /// is active.
    pub fn set_active_accounts(&self, accounts: Vec<LedgerAddress>) {
        *self.active_accounts.lock().unwrap() = Some(accounts);
    }

    /// Every payment submitted so far, in order.
    pub fn sent(&self) -> Vec<SentPayment> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for NullNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentNetwork for NullNetwork {
    async fn submit_payment(
        &self,
        source: &LedgerAddress,
        destination: &LedgerAddress,
        amount: Amount,
    ) -> SubmitOutcome {
        self.sent.lock().unwrap().push(SentPayment {
            source: source.clone(),
            destination: destination.clone(),
            amount,
        });

        if let Some(outcome) = self.scripted.lock().unwrap().pop_front() {
            return outcome;
        }

        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        SubmitOutcome::Confirmed {
            tx_id: format!("null-tx-{n}"),
        }
    }

    async fn account_active(&self, address: &LedgerAddress) -> Result<bool, LedgerError> {
        Ok(match &*self.active_accounts.lock().unwrap() {
            Some(accounts) => accounts.contains(address),
            None => true,
        })
    }
}
