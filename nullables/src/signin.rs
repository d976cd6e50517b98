//! Sign-in provider double.

use driplet_ledger::{LedgerError, SignInPayload, SignInProvider, SignInStatus};
use driplet_types::LedgerAddress;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A [`SignInProvider`] that replays scripted poll results.
///
/// Payload creation always succeeds with a generated id. Status polls drain
/// the script; an exhausted script reports an unsigned payload forever.
pub struct NullSignIn {
    statuses: Mutex<VecDeque<SignInStatus>>,
    next_payload: AtomicU64,
}

impl NullSignIn {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            next_payload: AtomicU64::new(1),
        }
    }

    /// Script a pending poll result.
    pub fn enqueue_pending(&self) {
        self.statuses.lock().unwrap().push_back(SignInStatus::default());
    }

    /// Script a signed poll result carrying `address`.
    pub fn enqueue_signed(&self, address: LedgerAddress) {
        self.statuses.lock().unwrap().push_back(SignInStatus {
            signed: true,
            address: Some(address),
        });
    }
}

impl Default for NullSignIn {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInProvider for NullSignIn {
    async fn create_payload(&self) -> Result<SignInPayload, LedgerError> {
        let n = self.next_payload.fetch_add(1, Ordering::SeqCst);
        Ok(SignInPayload {
            id: format!("null-payload-{n}"),
            url: format!("https://signin.invalid/null-payload-{n}"),
        })
    }

    async fn payload_status(&self, _id: &str) -> Result<SignInStatus, LedgerError> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> LedgerAddress {
        LedgerAddress::parse("rDsEH84xWaJycg341gzfx2ZMW7KrnBsVsy").unwrap()
    }

    #[tokio::test]
    async fn payload_ids_are_unique() {
        let signin = NullSignIn::new();
        let a = signin.create_payload().await.unwrap();
        let b = signin.create_payload().await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn script_drains_then_stays_pending() {
        let signin = NullSignIn::new();
        signin.enqueue_pending();
        signin.enqueue_signed(addr());

        let first = signin.payload_status("x").await.unwrap();
        assert!(!first.signed);

        let second = signin.payload_status("x").await.unwrap();
        assert!(second.signed);
        assert_eq!(second.address, Some(addr()));

        let third = signin.payload_status("x").await.unwrap();
        assert!(!third.signed);
    }
}
