//! HTTP client for the payment gateway.
//!
//! The gateway is a small trusted service that holds the faucet's signing
//! keys, signs submitted payments, and reports whether they validated. This
//! process never sees key material.

use crate::{LedgerError, PaymentNetwork, SubmitOutcome};
use driplet_types::{Amount, LedgerAddress};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct PaymentRequest<'a> {
    source: &'a str,
    destination: &'a str,
    amount_drops: u64,
}

#[derive(Deserialize)]
struct PaymentResponse {
    /// True once the transaction made it into a validated ledger.
    validated: bool,
    #[serde(default)]
    tx_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct AccountResponse {
    active: bool,
}

/// Payment gateway client.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
    submit_timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    async fn post_payment(
        &self,
        source: &LedgerAddress,
        destination: &LedgerAddress,
        amount: Amount,
    ) -> Result<PaymentResponse, LedgerError> {
        let url = format!("{}/payments", self.base_url);
        let body = PaymentRequest {
            source: source.as_str(),
            destination: destination.as_str(),
            amount_drops: amount.drops(),
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.submit_timeout)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LedgerError::HttpStatus {
                status: resp.status().as_u16(),
                url,
            });
        }

        resp.json()
            .await
            .map_err(|e| LedgerError::BadResponse(e.to_string()))
    }
}

impl PaymentNetwork for HttpGateway {
    async fn submit_payment(
        &self,
        source: &LedgerAddress,
        destination: &LedgerAddress,
        amount: Amount,
    ) -> SubmitOutcome {
        match self.post_payment(source, destination, amount).await {
            Ok(PaymentResponse {
                validated: true,
                tx_id: Some(tx_id),
                ..
            }) => {
                debug!(%destination, %amount, %tx_id, "payment validated");
                SubmitOutcome::Confirmed { tx_id }
            }
            Ok(PaymentResponse {
                validated: true,
                tx_id: None,
                ..
            }) => {
                // Validated but unidentified is indistinguishable from
                // unknown for reconciliation purposes.
                warn!(%destination, "gateway reported validation without a tx id");
                SubmitOutcome::TimedOut
            }
            Ok(PaymentResponse { reason, .. }) => SubmitOutcome::Rejected {
                reason: reason.unwrap_or_else(|| "gateway refused the payment".to_string()),
            },
            Err(LedgerError::HttpStatus { status, url }) if (400..500).contains(&status) => {
                SubmitOutcome::Rejected {
                    reason: format!("HTTP {status} from {url}"),
                }
            }
            Err(err) => {
                warn!(%destination, %amount, error = %err, "payment outcome unknown");
                SubmitOutcome::TimedOut
            }
        }
    }

    async fn account_active(&self, address: &LedgerAddress) -> Result<bool, LedgerError> {
        let url = format!("{}/accounts/{}", self.base_url, address);
        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(LedgerError::HttpStatus {
                status: resp.status().as_u16(),
                url,
            });
        }

        let account: AccountResponse = resp
            .json()
            .await
            .map_err(|e| LedgerError::BadResponse(e.to_string()))?;
        Ok(account.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let gateway = HttpGateway::new("https://gateway.example/");
        assert_eq!(gateway.base_url, "https://gateway.example");
    }

    #[test]
    fn payment_response_tolerates_missing_fields() {
        let resp: PaymentResponse = serde_json::from_str(r#"{"validated":false}"#).unwrap();
        assert!(!resp.validated);
        assert!(resp.tx_id.is_none());
        assert!(resp.reason.is_none());
    }

    #[test]
    fn payment_response_full() {
        let resp: PaymentResponse =
            serde_json::from_str(r#"{"validated":true,"tx_id":"ABC123"}"#).unwrap();
        assert!(resp.validated);
        assert_eq!(resp.tx_id.as_deref(), Some("ABC123"));
    }

    #[test]
    fn payment_request_serializes_drops() {
        let body = PaymentRequest {
            source: "rSource",
            destination: "rDest",
            amount_drops: 100,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount_drops"], 100);
        assert_eq!(json["destination"], "rDest");
    }
}
