//! Reward controller.
//!
//! Coordinates one flow per inbound event: gate check, challenge, answer,
//! disbursement, store update, bonus cascade. Per-user serialization comes
//! from two mechanisms working together: the challenge map's
//! consume-before-evaluate removal, and a second cooldown check after a
//! correct answer but before any payment leaves. Two interleaved answers
//! for the same user can both hold a correct answer, but only one still
//! holds a live challenge, and only one passes the second gate.

use crate::challenge::{ChallengeManager, ChallengeTag, Resolution};
use crate::cooldown;
use crate::disburse::{Disburser, DisbursementOutcome};
use crate::reply::{AccountStats, AnswerReply, ChallengePrompt, ReferralSummary, RequestReply};
use crate::{cascade, FaucetError};
use driplet_ledger::PaymentNetwork;
use driplet_store::{
    Account, AccountStore, Purpose, StoreError, TransactionRecord, TransactionStore, TxOutcome,
};
use driplet_types::{Amount, Clock, FaucetParams, LedgerAddress, Timestamp, UserId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::{info, warn};

pub struct RewardController<S, N, C> {
    store: S,
    disburser: Disburser<N>,
    challenges: ChallengeManager,
    clock: C,
    params: FaucetParams,
    rng: Mutex<StdRng>,
}

impl<S, N, C> RewardController<S, N, C>
where
    S: AccountStore + TransactionStore,
    N: PaymentNetwork,
    C: Clock,
{
    pub fn new(
        store: S,
        network: N,
        source: LedgerAddress,
        params: FaucetParams,
        clock: C,
    ) -> Result<Self, FaucetError> {
        Self::with_rng(store, network, source, params, clock, StdRng::from_entropy())
    }

    /// Deterministic variant for tests.
    ///
    /// Rejects inconsistent parameters up front; the lottery draw in
    /// particular must never see an inverted range.
    pub fn with_rng(
        store: S,
        network: N,
        source: LedgerAddress,
        params: FaucetParams,
        clock: C,
        rng: StdRng,
    ) -> Result<Self, FaucetError> {
        params
            .validate()
            .map_err(|e| FaucetError::Validation(e.to_string()))?;
        let challenges = ChallengeManager::new(params.challenge_expiry_secs);
        Ok(Self {
            store,
            disburser: Disburser::new(network, source),
            challenges,
            clock,
            params,
            rng: Mutex::new(rng),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn network(&self) -> &N {
        self.disburser.network()
    }

    pub fn params(&self) -> &FaucetParams {
        &self.params
    }

    /// Create the account on first contact. A referrer equal to the user,
    /// or one with no account of its own, is dropped rather than rejected.
    pub fn ensure_account(
        &self,
        user: UserId,
        referrer: Option<UserId>,
    ) -> Result<(), FaucetError> {
        if self.store.exists(user)? {
            return Ok(());
        }
        let referrer = match referrer {
            Some(id) if id != user && self.store.exists(id)? => Some(id),
            _ => None,
        };
        self.store.create(user, referrer, self.clock.now())?;
        info!(%user, ?referrer, "account created");
        Ok(())
    }

    /// Record the signed-in ledger address, authorizing the account.
    pub fn register_address(&self, user: UserId, address: LedgerAddress) -> Result<(), FaucetError> {
        self.store.set_address(user, address)?;
        info!(%user, "account authorized");
        Ok(())
    }

    pub fn set_subscribed(&self, user: UserId, subscribed: bool) -> Result<(), FaucetError> {
        Ok(self.store.set_subscribed(user, subscribed)?)
    }

    /// Begin a claim or lottery flow: check the gate, then issue a
    /// challenge. During cooldown no challenge is issued.
    pub fn request(&self, user: UserId, tag: ChallengeTag) -> Result<RequestReply, FaucetError> {
        let account = match self.store.get(user)? {
            Some(account) if account.authorized && account.address.is_some() => account,
            _ => return Ok(RequestReply::NotAuthorized),
        };
        if self.params.require_subscription && !account.subscribed {
            return Ok(RequestReply::NotSubscribed);
        }

        let now = self.clock.now();
        let (last, window) = self.gate_inputs(&account, tag);
        if !cooldown::eligible(now, last, window) {
            return Ok(RequestReply::CooldownActive {
                remaining_secs: cooldown::remaining(now, last, window),
            });
        }

        let mut rng = self.rng.lock().unwrap();
        let challenge = self.challenges.issue(user, tag, &mut *rng, now);
        Ok(RequestReply::Challenge(ChallengePrompt::from(&challenge)))
    }

    /// Resolve a challenge answer and, when everything still holds, pay.
    pub async fn answer(&self, user: UserId, submitted: u32) -> Result<AnswerReply, FaucetError> {
        let now = self.clock.now();
        let tag = match self.challenges.resolve(user, submitted, now) {
            Resolution::NoActiveChallenge => return Ok(AnswerReply::NoActiveChallenge),
            Resolution::Incorrect(tag) => {
                // Required re-arm: the user gets a fresh puzzle immediately.
                let mut rng = self.rng.lock().unwrap();
                let fresh = self.challenges.issue(user, tag, &mut *rng, now);
                return Ok(AnswerReply::Retry(ChallengePrompt::from(&fresh)));
            }
            Resolution::Correct(tag) => tag,
        };

        let account = self
            .store
            .get(user)?
            .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
        let address = account.address.clone().ok_or_else(|| {
            FaucetError::Validation(format!("user {user} has no ledger address"))
        })?;

        // Second gate check. The answer may arrive after the window has
        // been consumed by another device, or long after issuance.
        let (last, window) = self.gate_inputs(&account, tag);
        if !cooldown::eligible(now, last, window) {
            return Ok(AnswerReply::CooldownActive {
                remaining_secs: cooldown::remaining(now, last, window),
            });
        }

        let amount = self.draw_amount(tag);
        let outcome = self.disburser.send(&address, amount).await?;
        self.record_attempt(user, amount, tag, &outcome, now)?;

        let tx_id = match outcome {
            DisbursementOutcome::Settled { tx_id } => tx_id,
            DisbursementOutcome::Failed { reason } => {
                // The attempt did not consume the cooldown slot.
                return Ok(AnswerReply::PaymentFailed { reason });
            }
        };

        let new_user_bonus = match tag {
            ChallengeTag::Claim => {
                let pre_claim_count = account.claim_count;
                self.store.record_claim(user, amount, now)?;
                let report = cascade::run(
                    &self.store,
                    &self.disburser,
                    &self.params,
                    &account,
                    pre_claim_count,
                    amount,
                    now,
                )
                .await;
                report.new_user_bonus
            }
            ChallengeTag::Lottery => {
                self.store.record_lottery(user, amount, now)?;
                None
            }
        };

        Ok(AnswerReply::Paid {
            amount,
            tx_id,
            new_user_bonus,
        })
    }

    pub fn referral_summary(&self, user: UserId) -> Result<ReferralSummary, FaucetError> {
        let account = self
            .store
            .get(user)?
            .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
        Ok(ReferralSummary {
            referral_count: self.store.count_referrals(user)?,
            referral_profit: account.referral_profit,
        })
    }

    pub fn stats(&self, user: UserId) -> Result<AccountStats, FaucetError> {
        let account = self
            .store
            .get(user)?
            .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
        Ok(AccountStats {
            claims: account.claim_count,
            total_profit: account.total_profit,
            referral_profit: account.referral_profit,
        })
    }

    /// Drop expired challenges. Called periodically by the host.
    pub fn purge_expired_challenges(&self) -> usize {
        self.challenges.purge_expired(self.clock.now())
    }

    fn gate_inputs(&self, account: &Account, tag: ChallengeTag) -> (Option<Timestamp>, u64) {
        match tag {
            ChallengeTag::Claim => (account.last_claim, self.params.claim_cooldown_secs),
            ChallengeTag::Lottery => (account.last_lottery, self.params.lottery_cooldown_secs),
        }
    }

    fn draw_amount(&self, tag: ChallengeTag) -> Amount {
        match tag {
            ChallengeTag::Claim => self.params.claim_reward,
            ChallengeTag::Lottery => {
                let min = self.params.lottery_min.drops();
                let max = self.params.lottery_max.drops();
                let drops = self.rng.lock().unwrap().gen_range(min..=max);
                Amount::from_drops(drops)
            }
        }
    }

    fn record_attempt(
        &self,
        user: UserId,
        amount: Amount,
        tag: ChallengeTag,
        outcome: &DisbursementOutcome,
        now: Timestamp,
    ) -> Result<(), FaucetError> {
        let purpose = match tag {
            ChallengeTag::Claim => Purpose::Claim,
            ChallengeTag::Lottery => Purpose::Lottery,
        };
        if !outcome.is_settled() {
            warn!(%user, %amount, %purpose, "disbursement failed");
        }
        self.store.append(TransactionRecord {
            user,
            amount,
            purpose,
            outcome: if outcome.is_settled() {
                TxOutcome::Success
            } else {
                TxOutcome::Failed
            },
            ledger_tx_id: outcome.tx_id().map(str::to_string),
            recorded_at: now,
        })?;
        Ok(())
    }
}
