//! Events exchanged with the messaging transport.
//!
//! The transport adapter (a chat-bot frontend, or the daemon's line-based
//! dev console) turns user interactions into [`InboundEvent`]s and renders
//! [`OutboundReply`]s back to the user. Rendering details such as keyboards
//! and QR images stay on the transport side.

use driplet_faucet::{AccountStats, ChallengePrompt};
use driplet_types::{Amount, LedgerAddress, UserId};

/// One user interaction, as received from the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    /// First contact, optionally carrying a referral link's user id.
    Started {
        user: UserId,
        referrer: Option<UserId>,
    },
    ClaimRequested { user: UserId },
    LotteryRequested { user: UserId },
    ChallengeAnswered { user: UserId, answer: u32 },
    LoginRequested { user: UserId },
    /// The transport verified the user's channel subscription.
    SubscriptionConfirmed { user: UserId },
    ReferralInfoRequested { user: UserId },
}

impl InboundEvent {
    pub fn user(&self) -> UserId {
        match *self {
            InboundEvent::Started { user, .. }
            | InboundEvent::ClaimRequested { user }
            | InboundEvent::LotteryRequested { user }
            | InboundEvent::ChallengeAnswered { user, .. }
            | InboundEvent::LoginRequested { user }
            | InboundEvent::SubscriptionConfirmed { user }
            | InboundEvent::ReferralInfoRequested { user } => user,
        }
    }
}

/// One message for the transport to render to a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundReply {
    Welcome {
        user: UserId,
    },
    ChallengePresented {
        user: UserId,
        prompt: ChallengePrompt,
    },
    /// Wrong answer; a fresh challenge is already live.
    ChallengeRetry {
        user: UserId,
        prompt: ChallengePrompt,
    },
    /// Too early; carries the account's running figures so the transport
    /// can render them alongside the wait time.
    Cooldown {
        user: UserId,
        remaining_secs: u64,
        stats: AccountStats,
    },
    Paid {
        user: UserId,
        amount: Amount,
        tx_id: String,
        new_user_bonus: Option<Amount>,
    },
    PaymentFailed {
        user: UserId,
        reason: String,
    },
    NoActiveChallenge {
        user: UserId,
    },
    NotAuthorized {
        user: UserId,
    },
    NotSubscribed {
        user: UserId,
    },
    SubscriptionRecorded {
        user: UserId,
    },
    LoginUrl {
        user: UserId,
        url: String,
    },
    LoginCompleted {
        user: UserId,
        address: LedgerAddress,
    },
    LoginTimedOut {
        user: UserId,
    },
    /// The signed-in wallet is not activated on the ledger yet.
    WalletInactive {
        user: UserId,
        address: LedgerAddress,
    },
    ReferralInfo {
        user: UserId,
        referral_count: u64,
        referral_profit: Amount,
    },
    /// An internal failure the user can only retry.
    Error {
        user: UserId,
    },
}
