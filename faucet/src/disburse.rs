//! Single-payment disbursement.
//!
//! One invocation of [`Disburser::send`] yields exactly one outcome. Nothing
//! here touches durable storage; recording the attempt is the caller's job,
//! which keeps "did the payment happen" separate from "did we record it".

use crate::FaucetError;
use driplet_ledger::{PaymentNetwork, SubmitOutcome};
use driplet_types::{Amount, LedgerAddress};
use tracing::{info, warn};

/// Terminal result of one disbursement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisbursementOutcome {
    Settled { tx_id: String },
    /// Covers network rejection and unknown (timed out) outcomes alike; no
    /// ledger state is assumed and no retry is attempted here.
    Failed { reason: String },
}

impl DisbursementOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, DisbursementOutcome::Settled { .. })
    }

    pub fn tx_id(&self) -> Option<&str> {
        match self {
            DisbursementOutcome::Settled { tx_id } => Some(tx_id),
            DisbursementOutcome::Failed { .. } => None,
        }
    }
}

/// Submits payments from the operator-controlled source account.
pub struct Disburser<N> {
    network: N,
    source: LedgerAddress,
}

impl<N: PaymentNetwork> Disburser<N> {
    pub fn new(network: N, source: LedgerAddress) -> Self {
        Self { network, source }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Submit one payment and wait for its terminal outcome.
    ///
    /// A zero amount is a validation failure, rejected before any network
    /// call. Destination validity is carried by the [`LedgerAddress`] type.
    pub async fn send(
        &self,
        destination: &LedgerAddress,
        amount: Amount,
    ) -> Result<DisbursementOutcome, FaucetError> {
        if amount.is_zero() {
            return Err(FaucetError::Validation(
                "disbursement amount must be positive".to_string(),
            ));
        }

        match self
            .network
            .submit_payment(&self.source, destination, amount)
            .await
        {
            SubmitOutcome::Confirmed { tx_id } => {
                info!(%destination, %amount, %tx_id, "disbursement settled");
                Ok(DisbursementOutcome::Settled { tx_id })
            }
            SubmitOutcome::Rejected { reason } => {
                warn!(%destination, %amount, %reason, "disbursement rejected");
                Ok(DisbursementOutcome::Failed { reason })
            }
            SubmitOutcome::TimedOut => {
                warn!(%destination, %amount, "disbursement outcome unknown");
                Ok(DisbursementOutcome::Failed {
                    reason: "no definitive network outcome".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driplet_nullables::NullNetwork;

    fn addr(tail: char) -> LedgerAddress {
        LedgerAddress::parse(&format!("rDsEH84xWaJycg341gzfx2ZMW7KrnBsVs{tail}")).unwrap()
    }

    #[tokio::test]
    async fn settles_with_the_network_tx_id() {
        let disburser = Disburser::new(NullNetwork::new(), addr('a'));
        let outcome = disburser
            .send(&addr('b'), Amount::from_drops(100))
            .await
            .unwrap();

        assert_eq!(outcome.tx_id(), Some("null-tx-1"));
        let sent = disburser.network().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].source, addr('a'));
    }

    #[tokio::test]
    async fn rejection_becomes_a_failed_outcome() {
        let network = NullNetwork::new();
        network.enqueue_outcome(SubmitOutcome::Rejected {
            reason: "insufficient funds".to_string(),
        });
        let disburser = Disburser::new(network, addr('a'));

        let outcome = disburser
            .send(&addr('b'), Amount::from_drops(100))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DisbursementOutcome::Failed {
                reason: "insufficient funds".to_string()
            }
        );
    }

    #[tokio::test]
    async fn timeout_becomes_a_failed_outcome() {
        let network = NullNetwork::new();
        network.enqueue_outcome(SubmitOutcome::TimedOut);
        let disburser = Disburser::new(network, addr('a'));

        let outcome = disburser
            .send(&addr('b'), Amount::from_drops(100))
            .await
            .unwrap();
        assert!(!outcome.is_settled());
    }

    #[tokio::test]
    async fn zero_amount_never_reaches_the_network() {
        let disburser = Disburser::new(NullNetwork::new(), addr('a'));
        let result = disburser.send(&addr('b'), Amount::ZERO).await;

        assert!(matches!(result, Err(FaucetError::Validation(_))));
        assert!(disburser.network().sent().is_empty());
    }
}
