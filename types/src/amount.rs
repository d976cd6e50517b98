//! Token amount as a fixed-point integer.
//!
//! Amounts are stored as raw drops (u64) to avoid floating-point errors.
//! One token is 1_000_000 drops, giving 6-decimal precision end to end —
//! the same precision the ledger itself settles at.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Drops per whole token.
pub const DROPS_PER_TOKEN: u64 = 1_000_000;

/// A token amount in raw drops.
///
/// Serializes as a decimal string ("0.0001") so configs and records stay
/// human-readable without losing precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn from_drops(drops: u64) -> Self {
        Self(drops)
    }

    pub fn drops(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Basis-point fraction of this amount, truncating toward zero.
    ///
    /// `mul_bps(1000)` is 10%. Returns `None` on overflow or `bps > 10_000`.
    pub fn mul_bps(self, bps: u32) -> Option<Self> {
        if bps > 10_000 {
            return None;
        }
        let scaled = (self.0 as u128).checked_mul(bps as u128)? / 10_000;
        u64::try_from(scaled).ok().map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / DROPS_PER_TOKEN;
        let frac = self.0 % DROPS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let frac = format!("{frac:06}");
            write!(f, "{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |detail: &str| TypeError::InvalidAmount(format!("{detail}: {s:?}"));

        let (whole_str, frac_str) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole_str.is_empty() && frac_str.is_empty() {
            return Err(bad("empty amount"));
        }
        if frac_str.len() > 6 {
            return Err(bad("more than 6 decimal places"));
        }

        let whole: u64 = if whole_str.is_empty() {
            0
        } else {
            whole_str.parse().map_err(|_| bad("invalid integer part"))?
        };
        let frac: u64 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{frac_str:0<6}");
            padded.parse().map_err(|_| bad("invalid fractional part"))?
        };

        whole
            .checked_mul(DROPS_PER_TOKEN)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(|| bad("amount overflows"))
    }
}

impl TryFrom<String> for Amount {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Amount> for String {
    fn from(a: Amount) -> Self {
        a.to_string()
    }
}
