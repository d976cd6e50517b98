//! Wallet sign-in handshake.
//!
//! Linking a user to a ledger address works through a hosted sign-in
//! service: the faucet creates a payload, hands the user its URL, and polls
//! the payload until the user signs it in their wallet. The signed payload
//! carries the wallet's address.

use crate::LedgerError;
use driplet_types::LedgerAddress;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Consecutive poll failures tolerated before the wait is abandoned.
const MAX_POLL_FAILURES: u32 = 3;

/// A freshly created sign-in payload.
#[derive(Clone, Debug)]
pub struct SignInPayload {
    /// Service-side identifier, used for status polling.
    pub id: String,
    /// URL the user opens in their wallet to sign.
    pub url: String,
}

/// Snapshot of a payload's state at poll time.
#[derive(Clone, Debug, Default)]
pub struct SignInStatus {
    pub signed: bool,
    /// Present once signed.
    pub address: Option<LedgerAddress>,
}

/// How a sign-in wait ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn(LedgerAddress),
    /// The user never signed within the allowed window.
    TimedOut,
    /// A newer login attempt superseded this one.
    Cancelled,
}

pub trait SignInProvider: Send + Sync {
    fn create_payload(&self) -> impl Future<Output = Result<SignInPayload, LedgerError>> + Send;

    fn payload_status(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<SignInStatus, LedgerError>> + Send;
}

/// Poll a payload until it is signed, the window elapses, or the wait is
/// cancelled. Transient poll failures are tolerated up to
/// [`MAX_POLL_FAILURES`] in a row.
///
/// A payload reported signed without an address is treated as a service
/// fault, not a sign-in.
pub async fn await_signin<P: SignInProvider>(
    provider: &P,
    payload_id: &str,
    poll_interval: Duration,
    max_wait: Duration,
    mut cancel: oneshot::Receiver<()>,
) -> Result<SignInOutcome, LedgerError> {
    let deadline = tokio::time::Instant::now() + max_wait;
    let mut failures = 0u32;
    let mut cancel_open = true;

    loop {
        tokio::select! {
            res = &mut cancel, if cancel_open => {
                match res {
                    Ok(()) => {
                        debug!(payload_id, "sign-in wait cancelled");
                        return Ok(SignInOutcome::Cancelled);
                    }
                    // Sender dropped without cancelling; keep polling.
                    Err(_) => cancel_open = false,
                }
            }
            _ = tokio::time::sleep(poll_interval) => {
                if tokio::time::Instant::now() >= deadline {
                    return Ok(SignInOutcome::TimedOut);
                }
                match provider.payload_status(payload_id).await {
                    Ok(SignInStatus { signed: true, address: Some(address) }) => {
                        return Ok(SignInOutcome::SignedIn(address));
                    }
                    Ok(SignInStatus { signed: true, address: None }) => {
                        return Err(LedgerError::BadResponse(
                            "signed payload carried no address".to_string(),
                        ));
                    }
                    Ok(_) => failures = 0,
                    Err(err) => {
                        failures += 1;
                        warn!(payload_id, failures, error = %err, "sign-in poll failed");
                        if failures >= MAX_POLL_FAILURES {
                            return Err(LedgerError::SignInUnavailable(err.to_string()));
                        }
                    }
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct CreatePayloadResponse {
    uuid: String,
    next: PayloadNext,
}

#[derive(Deserialize)]
struct PayloadNext {
    always: String,
}

#[derive(Deserialize)]
struct PayloadStatusResponse {
    meta: PayloadMeta,
    #[serde(default)]
    response: PayloadResult,
}

#[derive(Deserialize)]
struct PayloadMeta {
    signed: bool,
}

#[derive(Deserialize, Default)]
struct PayloadResult {
    #[serde(default)]
    account: Option<String>,
}

/// Client for the hosted sign-in service.
pub struct HttpSignIn {
    base_url: String,
    api_key: String,
    api_secret: String,
    client: reqwest::Client,
}

impl HttpSignIn {
    pub fn new(base_url: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
            .header("X-API-Secret", &self.api_secret)
            .timeout(Duration::from_secs(10))
    }
}

impl SignInProvider for HttpSignIn {
    async fn create_payload(&self) -> Result<SignInPayload, LedgerError> {
        let url = format!("{}/payload", self.base_url);
        let body = serde_json::json!({ "txjson": { "TransactionType": "SignIn" } });

        let resp = self
            .authed(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LedgerError::HttpStatus {
                status: resp.status().as_u16(),
                url,
            });
        }

        let created: CreatePayloadResponse = resp
            .json()
            .await
            .map_err(|e| LedgerError::BadResponse(e.to_string()))?;

        Ok(SignInPayload {
            id: created.uuid,
            url: created.next.always,
        })
    }

    async fn payload_status(&self, id: &str) -> Result<SignInStatus, LedgerError> {
        let url = format!("{}/payload/{}", self.base_url, id);
        let resp = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LedgerError::HttpStatus {
                status: resp.status().as_u16(),
                url,
            });
        }

        let status: PayloadStatusResponse = resp
            .json()
            .await
            .map_err(|e| LedgerError::BadResponse(e.to_string()))?;

        let address = match status.response.account {
            Some(raw) => Some(
                LedgerAddress::parse(&raw)
                    .map_err(|e| LedgerError::BadResponse(e.to_string()))?,
            ),
            None => None,
        };

        Ok(SignInStatus {
            signed: status.meta.signed,
            address,
        })
    }
}
