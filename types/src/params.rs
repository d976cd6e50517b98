//! Faucet parameters — the tunables the operator is expected to adjust.

use crate::amount::Amount;
use crate::error::TypeError;
use serde::{Deserialize, Serialize};

/// All recognized reward/cooldown knobs.
///
/// Embedded in the node's TOML config; every field has a default so a
/// partial `[faucet]` section works.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FaucetParams {
    /// Seconds between claims for one user.
    #[serde(default = "default_claim_cooldown")]
    pub claim_cooldown_secs: u64,

    /// Seconds between lottery attempts for one user (independent of claims).
    #[serde(default = "default_lottery_cooldown")]
    pub lottery_cooldown_secs: u64,

    /// Fixed reward paid per successful claim.
    #[serde(default = "default_claim_reward")]
    pub claim_reward: Amount,

    /// Inclusive lower bound of the lottery draw.
    #[serde(default = "default_lottery_min")]
    pub lottery_min: Amount,

    /// Inclusive upper bound of the lottery draw.
    #[serde(default = "default_lottery_max")]
    pub lottery_max: Amount,

    /// Referrer's cut of each referred claim, in basis points (1000 = 10%).
    #[serde(default = "default_referral_rate_bps")]
    pub referral_rate_bps: u32,

    /// One-off bonus paid to a referred user on their first claim.
    #[serde(default = "default_new_user_bonus")]
    pub new_user_bonus: Amount,

    /// Whether claims require the transport-verified subscription flag.
    #[serde(default = "default_true")]
    pub require_subscription: bool,

    /// Seconds before an unanswered challenge expires.
    #[serde(default = "default_challenge_expiry")]
    pub challenge_expiry_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_claim_cooldown() -> u64 {
    3600
}

fn default_lottery_cooldown() -> u64 {
    3600
}

fn default_claim_reward() -> Amount {
    Amount::from_drops(100) // 0.0001
}

fn default_lottery_min() -> Amount {
    Amount::from_drops(100) // 0.0001
}

fn default_lottery_max() -> Amount {
    Amount::from_drops(1_000) // 0.001
}

fn default_referral_rate_bps() -> u32 {
    1000 // 10%
}

fn default_new_user_bonus() -> Amount {
    Amount::from_drops(100) // 0.0001
}

fn default_true() -> bool {
    true
}

fn default_challenge_expiry() -> u64 {
    300
}

// ── Impl ───────────────────────────────────────────────────────────────

impl FaucetParams {
    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.lottery_min > self.lottery_max {
            return Err(TypeError::InvalidParams(format!(
                "lottery_min {} exceeds lottery_max {}",
                self.lottery_min, self.lottery_max
            )));
        }
        if self.referral_rate_bps > 10_000 {
            return Err(TypeError::InvalidParams(format!(
                "referral_rate_bps {} exceeds 10000",
                self.referral_rate_bps
            )));
        }
        if self.claim_reward.is_zero() {
            return Err(TypeError::InvalidParams("claim_reward is zero".into()));
        }
        Ok(())
    }
}

impl Default for FaucetParams {
    fn default() -> Self {
        Self {
            claim_cooldown_secs: default_claim_cooldown(),
            lottery_cooldown_secs: default_lottery_cooldown(),
            claim_reward: default_claim_reward(),
            lottery_min: default_lottery_min(),
            lottery_max: default_lottery_max(),
            referral_rate_bps: default_referral_rate_bps(),
            new_user_bonus: default_new_user_bonus(),
            require_subscription: default_true(),
            challenge_expiry_secs: default_challenge_expiry(),
        }
    }
}
