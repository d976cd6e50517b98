//! Ledger-facing clients for the driplet faucet.
//!
//! Two external services live behind traits here. [`PaymentNetwork`] submits
//! payments through a signing gateway that holds the faucet's keys and waits
//! for validation. [`SignInProvider`] drives the wallet sign-in handshake
//! that links a user to a ledger address. The faucet core never talks HTTP
//! directly; it sees only these traits, so tests substitute scripted
//! implementations.

pub mod error;
pub mod gateway;
pub mod signin;

pub use error::LedgerError;
pub use gateway::HttpGateway;
pub use signin::{
    await_signin, HttpSignIn, SignInOutcome, SignInPayload, SignInProvider, SignInStatus,
};

use driplet_types::{Amount, LedgerAddress};
use std::future::Future;

/// Terminal result of one payment submission.
///
/// `TimedOut` covers every case where the outcome is unknown: the payment
/// may or may not have validated. Callers must treat it as a failure and
/// must not retry automatically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validated on the ledger.
    Confirmed { tx_id: String },
    /// Definitively refused before validation.
    Rejected { reason: String },
    /// No definitive answer arrived.
    TimedOut,
}

/// Payment submission and account inspection against the ledger.
pub trait PaymentNetwork: Send + Sync {
    /// Submit a payment and wait for a terminal outcome. Transport failures
    /// surface as [`SubmitOutcome::TimedOut`], never as an `Err`, so one
    /// submission always yields exactly one outcome.
    fn submit_payment(
        &self,
        source: &LedgerAddress,
        destination: &LedgerAddress,
        amount: Amount,
    ) -> impl Future<Output = SubmitOutcome> + Send;

    /// Whether the account exists on the ledger and can receive payments.
    fn account_active(
        &self,
        address: &LedgerAddress,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;
}
