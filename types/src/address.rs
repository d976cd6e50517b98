//! Ledger address type with `r` prefix.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A classic ledger account address, always prefixed with `r`.
///
/// Validation is syntactic only: prefix, length, and base58 alphabet.
/// Whether the account actually exists on the network is answered by
/// the payment network's activation query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LedgerAddress(String);

/// Base58 alphabet used by the ledger (no `0`, `O`, `I`, `l`).
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const MIN_LEN: usize = 25;
const MAX_LEN: usize = 35;

impl LedgerAddress {
    /// The standard prefix for classic addresses.
    pub const PREFIX: char = 'r';

    /// Parse and validate a raw address string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypeError> {
        let s = raw.into();
        if !s.starts_with(Self::PREFIX) {
            return Err(TypeError::InvalidAddress(format!(
                "address must start with '{}': {s}",
                Self::PREFIX
            )));
        }
        if s.len() < MIN_LEN || s.len() > MAX_LEN {
            return Err(TypeError::InvalidAddress(format!(
                "address length {} outside [{MIN_LEN}, {MAX_LEN}]",
                s.len()
            )));
        }
        if let Some(bad) = s.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
            return Err(TypeError::InvalidAddress(format!(
                "address contains non-base58 character '{bad}'"
            )));
        }
        Ok(Self(s))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address is still well-formed.
    pub fn is_valid(&self) -> bool {
        Self::parse(self.0.clone()).is_ok()
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LedgerAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LedgerAddress {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<LedgerAddress> for String {
    fn from(addr: LedgerAddress) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "rDsEH84xWaJycg341gzfx2ZMW7KrnBsVsy";

    #[test]
    fn valid_address_parses() {
        let addr = LedgerAddress::parse(GOOD).unwrap();
        assert_eq!(addr.as_str(), GOOD);
        assert!(addr.is_valid());
    }

    #[test]
    fn missing_prefix_rejected() {
        assert!(LedgerAddress::parse("xDsEH84xWaJycg341gzfx2ZMW7KrnBsVsy").is_err());
    }

    #[test]
    fn too_short_rejected() {
        assert!(LedgerAddress::parse("rShort").is_err());
    }

    #[test]
    fn non_base58_rejected() {
        // '0' and 'O' are not in the alphabet.
        assert!(LedgerAddress::parse("rDsEH84xWaJycg341gzfx2ZMW0KrnBsVsy").is_err());
        assert!(LedgerAddress::parse("rDsEH84xWaJycg341gzfx2ZMWOKrnBsVsy").is_err());
    }

    #[test]
    fn serde_round_trip_validates() {
        let json = format!("\"{GOOD}\"");
        let addr: LedgerAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&addr).unwrap(), json);

        let bad: Result<LedgerAddress, _> = serde_json::from_str("\"not-an-address\"");
        assert!(bad.is_err());
    }
}
