//! Referral and first-claim bonus cascade.
//!
//! Runs only after a claim settles. Both bonuses are best-effort: every
//! attempt is recorded as its own transaction, a failed bonus is never
//! retried inline, and nothing here affects the already-settled claim.

use crate::disburse::{Disburser, DisbursementOutcome};
use driplet_ledger::PaymentNetwork;
use driplet_store::{Account, AccountStore, Purpose, TransactionRecord, TransactionStore, TxOutcome};
use driplet_types::{Amount, FaucetParams, Timestamp, UserId};
use tracing::warn;

/// What the cascade did, for the caller's reply to the claimant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub referral: Option<DisbursementOutcome>,
    /// Present only when the first-claim bonus settled.
    pub new_user_bonus: Option<Amount>,
}

fn record(
    store: &impl TransactionStore,
    user: UserId,
    amount: Amount,
    purpose: Purpose,
    outcome: &DisbursementOutcome,
    now: Timestamp,
) {
    let result = store.append(TransactionRecord {
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
    });
    if let Err(err) = result {
        warn!(%user, %purpose, error = %err, "failed to record bonus attempt");
    }
}

/// Run the bonus cascade for a settled claim.
///
/// `claimant` is the account as read before the claim was recorded, and
/// `pre_claim_count` its claim counter at that point; a zero counter with a
/// referrer present marks this as the user's first claim.
pub async fn run<S, N>(
    store: &S,
    disburser: &Disburser<N>,
    params: &FaucetParams,
    claimant: &Account,
    pre_claim_count: u64,
    claim_amount: Amount,
    now: Timestamp,
) -> CascadeReport
where
    S: AccountStore + TransactionStore,
    N: PaymentNetwork,
{
    let mut report = CascadeReport::default();

    let referrer_id = match claimant.referrer {
        Some(id) => id,
        None => return report,
    };

    report.referral = pay_referrer(store, disburser, params, referrer_id, claim_amount, now).await;

    if pre_claim_count == 0 {
        report.new_user_bonus =
            pay_new_user(store, disburser, params, claimant, now).await;
    }

    report
}

async fn pay_referrer<S, N>(
    store: &S,
    disburser: &Disburser<N>,
    params: &FaucetParams,
    referrer_id: UserId,
    claim_amount: Amount,
    now: Timestamp,
) -> Option<DisbursementOutcome>
where
    S: AccountStore + TransactionStore,
    N: PaymentNetwork,
{
    let bonus = match claim_amount.mul_bps(params.referral_rate_bps) {
        Some(b) if !b.is_zero() => b,
        _ => return None,
    };

    let referrer = match store.get(referrer_id) {
        Ok(Some(account)) => account,
        Ok(None) => return None,
        Err(err) => {
            warn!(%referrer_id, error = %err, "could not load referrer");
            return None;
        }
    };
    let address = referrer.address.as_ref()?;

    let outcome = match disburser.send(address, bonus).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(%referrer_id, error = %err, "referral bonus rejected before submission");
            return None;
        }
    };

    record(store, referrer_id, bonus, Purpose::ReferralBonus, &outcome, now);
    if outcome.is_settled() {
        if let Err(err) = store.add_referral_profit(referrer_id, bonus) {
            warn!(%referrer_id, error = %err, "settled referral bonus not credited");
        }
    }
    Some(outcome)
}

async fn pay_new_user<S, N>(
    store: &S,
    disburser: &Disburser<N>,
    params: &FaucetParams,
    claimant: &Account,
    now: Timestamp,
) -> Option<Amount>
where
    S: AccountStore + TransactionStore,
    N: PaymentNetwork,
{
    if params.new_user_bonus.is_zero() {
        return None;
    }
    let address = claimant.address.as_ref()?;

    let outcome = match disburser.send(address, params.new_user_bonus).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(user = %claimant.user_id, error = %err, "new-user bonus rejected before submission");
            return None;
        }
    };

    record(
        store,
        claimant.user_id,
        params.new_user_bonus,
        Purpose::NewUserBonus,
        &outcome,
        now,
    );
    outcome.is_settled().then_some(params.new_user_bonus)
}
