//! The faucet node: event loop and login session tracking.
//!
//! Events arrive on an mpsc channel and each one is handled on its own
//! task, so a slow payment or a pending sign-in never blocks other users.
//! Per-user serialization inside a flow is the controller's concern. The
//! node additionally tracks pending logins so a repeated login request
//! cancels the previous wait instead of leaving it orphaned, and sweeps
//! expired challenges on a timer.

use crate::config::NodeConfig;
use crate::events::{InboundEvent, OutboundReply};
use crate::shutdown::ShutdownHandle;
use crate::NodeError;
use driplet_faucet::{AnswerReply, ChallengeTag, RequestReply, RewardController};
use driplet_ledger::{await_signin, PaymentNetwork, SignInOutcome, SignInProvider};
use driplet_store::{AccountStore, TransactionStore};
use driplet_types::{Clock, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub struct FaucetNode<S, N, C, P> {
    controller: RewardController<S, N, C>,
    signin: P,
    signin_poll: Duration,
    signin_max_wait: Duration,
    sweep_interval: Duration,
    /// Cancellation handles for pending sign-in waits, one per user.
    logins: Mutex<HashMap<UserId, oneshot::Sender<()>>>,
    replies: mpsc::Sender<OutboundReply>,
}

impl<S, N, C, P> FaucetNode<S, N, C, P>
where
    S: AccountStore + TransactionStore + 'static,
    N: PaymentNetwork + 'static,
    C: Clock + 'static,
    P: SignInProvider + 'static,
{
    pub fn new(
        controller: RewardController<S, N, C>,
        signin: P,
        config: &NodeConfig,
        replies: mpsc::Sender<OutboundReply>,
    ) -> Self {
        Self {
            controller,
            signin,
            signin_poll: Duration::from_secs(config.signin_poll_secs),
            signin_max_wait: Duration::from_secs(config.signin_max_wait_secs),
            sweep_interval: Duration::from_secs(config.challenge_sweep_secs),
            logins: Mutex::new(HashMap::new()),
            replies,
        }
    }

    pub fn controller(&self) -> &RewardController<S, N, C> {
        &self.controller
    }

    /// Process events until the channel closes or shutdown is signalled.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<InboundEvent>,
        mut shutdown: ShutdownHandle,
    ) {
        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("faucet node running");

        loop {
            tokio::select! {
                _ = shutdown.triggered() => {
                    info!("shutdown signalled");
                    break;
                }
                _ = sweep.tick() => {
                    let purged = self.controller.purge_expired_challenges();
                    if purged > 0 {
                        debug!(purged, "expired challenges removed");
                    }
                }
                event = events.recv() => match event {
                    Some(event) => self.clone().dispatch(event),
                    None => {
                        info!("event channel closed");
                        break;
                    }
                },
            }
        }
    }

    fn dispatch(self: Arc<Self>, event: InboundEvent) {
        tokio::spawn(async move {
            let user = event.user();
            if let Err(err) = self.handle(event).await {
                warn!(%user, error = %err, "event handling failed");
                self.send(OutboundReply::Error { user }).await;
            }
        });
    }

    async fn handle(&self, event: InboundEvent) -> Result<(), NodeError> {
        match event {
            InboundEvent::Started { user, referrer } => {
                self.controller.ensure_account(user, referrer)?;
                self.send(OutboundReply::Welcome { user }).await;
            }
            InboundEvent::ClaimRequested { user } => {
                let reply = self.controller.request(user, ChallengeTag::Claim)?;
                let out = self.request_reply(user, reply)?;
                self.send(out).await;
            }
            InboundEvent::LotteryRequested { user } => {
                let reply = self.controller.request(user, ChallengeTag::Lottery)?;
                let out = self.request_reply(user, reply)?;
                self.send(out).await;
            }
            InboundEvent::ChallengeAnswered { user, answer } => {
                let reply = self.controller.answer(user, answer).await?;
                let out = self.answer_reply(user, reply)?;
                self.send(out).await;
            }
            InboundEvent::LoginRequested { user } => {
                self.handle_login(user).await?;
            }
            InboundEvent::SubscriptionConfirmed { user } => {
                self.controller.set_subscribed(user, true)?;
                self.send(OutboundReply::SubscriptionRecorded { user }).await;
            }
            InboundEvent::ReferralInfoRequested { user } => {
                let summary = self.controller.referral_summary(user)?;
                self.send(OutboundReply::ReferralInfo {
                    user,
                    referral_count: summary.referral_count,
                    referral_profit: summary.referral_profit,
                })
                .await;
            }
        }
        Ok(())
    }

    /// Run one sign-in handshake for `user`, superseding any pending one.
    async fn handle_login(&self, user: UserId) -> Result<(), NodeError> {
        let payload = self.signin.create_payload().await?;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        if let Some(previous) = self.logins.lock().unwrap().insert(user, cancel_tx) {
            debug!(%user, "superseding pending login");
            let _ = previous.send(());
        }

        self.send(OutboundReply::LoginUrl {
            user,
            url: payload.url.clone(),
        })
        .await;

        let outcome = await_signin(
            &self.signin,
            &payload.id,
            self.signin_poll,
            self.signin_max_wait,
            cancel_rx,
        )
        .await;

        // A superseded wait must not remove its successor's handle.
        if !matches!(&outcome, Ok(SignInOutcome::Cancelled)) {
            self.logins.lock().unwrap().remove(&user);
        }

        match outcome? {
            SignInOutcome::SignedIn(address) => {
                if self.controller.network().account_active(&address).await? {
                    self.controller.register_address(user, address.clone())?;
                    self.send(OutboundReply::LoginCompleted { user, address }).await;
                } else {
                    self.send(OutboundReply::WalletInactive { user, address }).await;
                }
            }
            SignInOutcome::TimedOut => {
                self.send(OutboundReply::LoginTimedOut { user }).await;
            }
            SignInOutcome::Cancelled => {}
        }
        Ok(())
    }

    fn request_reply(&self, user: UserId, reply: RequestReply) -> Result<OutboundReply, NodeError> {
        Ok(match reply {
            RequestReply::Challenge(prompt) => OutboundReply::ChallengePresented { user, prompt },
            RequestReply::CooldownActive { remaining_secs } => self.cooldown(user, remaining_secs)?,
            RequestReply::NotAuthorized => OutboundReply::NotAuthorized { user },
            RequestReply::NotSubscribed => OutboundReply::NotSubscribed { user },
        })
    }

    fn answer_reply(&self, user: UserId, reply: AnswerReply) -> Result<OutboundReply, NodeError> {
        Ok(match reply {
            AnswerReply::Paid {
                amount,
                tx_id,
                new_user_bonus,
            } => OutboundReply::Paid {
                user,
                amount,
                tx_id,
                new_user_bonus,
            },
            AnswerReply::Retry(prompt) => OutboundReply::ChallengeRetry { user, prompt },
            AnswerReply::NoActiveChallenge => OutboundReply::NoActiveChallenge { user },
            AnswerReply::CooldownActive { remaining_secs } => self.cooldown(user, remaining_secs)?,
            AnswerReply::PaymentFailed { reason } => OutboundReply::PaymentFailed { user, reason },
        })
    }

    /// Cooldown messages show the account's running figures, so the wait
    /// is paired with what the user has already earned.
    fn cooldown(&self, user: UserId, remaining_secs: u64) -> Result<OutboundReply, NodeError> {
        let stats = self.controller.stats(user)?;
        Ok(OutboundReply::Cooldown {
            user,
            remaining_secs,
            stats,
        })
    }

    async fn send(&self, reply: OutboundReply) {
        if self.replies.send(reply).await.is_err() {
            warn!("reply channel closed");
        }
    }
}
