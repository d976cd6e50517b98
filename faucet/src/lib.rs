//! Reward-disbursement core for the driplet faucet.
//!
//! The claim/lottery flow is a small state machine: a cooldown gate, an
//! arithmetic challenge, a re-checked gate, one payment, one transaction
//! record, then an optional bonus cascade. [`RewardController`] wires the
//! pieces together over storage, payment-network, and clock traits, so the
//! whole flow runs against nullable doubles in tests.

pub mod cascade;
pub mod challenge;
pub mod controller;
pub mod cooldown;
pub mod disburse;
pub mod error;
pub mod reply;

pub use cascade::CascadeReport;
pub use challenge::{Challenge, ChallengeManager, ChallengeTag, Resolution};
pub use controller::RewardController;
pub use disburse::{Disburser, DisbursementOutcome};
pub use error::FaucetError;
pub use reply::{AccountStats, AnswerReply, ChallengePrompt, ReferralSummary, RequestReply};
