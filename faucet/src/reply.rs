//! Outcomes reported to the messaging transport.
//!
//! These enums are the controller's whole vocabulary toward the user.
//! Cooldowns and missing sessions are expected control flow, carried here
//! rather than as errors.

use crate::challenge::Challenge;
use driplet_types::Amount;

/// What the user needs to see to answer a challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengePrompt {
    pub question: String,
    pub options: Vec<u32>,
}

impl From<&Challenge> for ChallengePrompt {
    fn from(challenge: &Challenge) -> Self {
        Self {
            question: challenge.question.clone(),
            options: challenge.options.clone(),
        }
    }
}

/// Reply to a claim or lottery request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestReply {
    /// Gate passed; a challenge now stands between the user and the payout.
    Challenge(ChallengePrompt),
    CooldownActive { remaining_secs: u64 },
    /// No account, or the wallet sign-in has not completed.
    NotAuthorized,
    /// Channel subscription is required and missing.
    NotSubscribed,
}

/// Reply to a challenge answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerReply {
    Paid {
        amount: Amount,
        tx_id: String,
        /// Set when a first-claim bonus also settled.
        new_user_bonus: Option<Amount>,
    },
    /// Wrong answer; a fresh challenge with the same tag is already live.
    Retry(ChallengePrompt),
    /// Never issued, consumed by a racing submission, or expired.
    NoActiveChallenge,
    /// The pre-disbursement gate re-check failed.
    CooldownActive { remaining_secs: u64 },
    /// The payment did not settle; the cooldown slot was not consumed.
    PaymentFailed { reason: String },
}

/// Referral standing, for the user-facing stats view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferralSummary {
    pub referral_count: u64,
    pub referral_profit: Amount,
}

/// Lifetime account figures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountStats {
    pub claims: u64,
    pub total_profit: Amount,
    pub referral_profit: Amount,
}
